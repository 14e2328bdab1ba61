//! Parser for `/proc/<pid>/smaps_rollup`, the kernel's pre-summed view of
//! `smaps`. Only the fields that cannot be had from `statm` are extracted:
//! pss, swap, and the private pages that make up the unique set size.

use std::fs;
use std::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SmapsRollup {
    /// Unique set size: private clean + private dirty (+ private hugetlb).
    pub uss: u64,
    /// Proportional set size.
    pub pss: u64,
    /// Swapped-out size.
    pub swap: u64,
}

pub(crate) fn read(pid: i32) -> io::Result<SmapsRollup> {
    let text = fs::read_to_string(format!("/proc/{pid}/smaps_rollup"))?;
    Ok(parse(&text))
}

fn parse(text: &str) -> SmapsRollup {
    let mut pss = 0u64;
    let mut swap = 0u64;
    let mut private_clean = 0u64;
    let mut private_dirty = 0u64;
    let mut private_hugetlb = 0u64;

    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        // Value lines look like "Pss:              1234 kB". Anything that
        // does not fit that shape (the address-range header line) is skipped.
        let Some(kb) = rest.trim().strip_suffix("kB") else {
            continue;
        };
        let Ok(kb) = kb.trim().parse::<u64>() else {
            continue;
        };

        match key {
            "Pss" => pss = kb,
            "Swap" => swap = kb,
            "Private_Clean" => private_clean = kb,
            "Private_Dirty" => private_dirty = kb,
            "Private_Hugetlb" => private_hugetlb = kb,
            _ => {}
        }
    }

    SmapsRollup {
        uss: (private_clean + private_dirty + private_hugetlb) * 1024,
        pss: pss * 1024,
        swap: swap * 1024,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
5632f0a1c000-7ffd1f3a5000 ---p 00000000 00:00 0                          [rollup]
Rss:                3328 kB
Pss:                1048 kB
Pss_Dirty:           380 kB
Pss_Anon:            380 kB
Pss_File:            668 kB
Pss_Shmem:             0 kB
Shared_Clean:       2948 kB
Shared_Dirty:          0 kB
Private_Clean:       240 kB
Private_Dirty:       140 kB
Referenced:         3328 kB
Anonymous:           380 kB
LazyFree:              0 kB
AnonHugePages:         0 kB
ShmemPmdMapped:        0 kB
FilePmdMapped:         0 kB
Shared_Hugetlb:        0 kB
Private_Hugetlb:       0 kB
Swap:                 12 kB
SwapPss:              12 kB
Locked:                0 kB
";

    #[test]
    fn parses_real_shaped_rollup() {
        let rollup = parse(SAMPLE);
        assert_eq!(rollup.pss, 1048 * 1024);
        assert_eq!(rollup.uss, (240 + 140) * 1024);
        assert_eq!(rollup.swap, 12 * 1024);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let rollup = parse("Rss:  100 kB\n");
        assert_eq!(rollup, SmapsRollup::default());
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let rollup = parse("not a field\nPss: oops kB\nPss:   8 kB\nSwap: 4\n");
        assert_eq!(rollup.pss, 8 * 1024);
        // "Swap: 4" has no kB suffix and is ignored rather than misread.
        assert_eq!(rollup.swap, 0);
    }
}
