/// Byte-string encoding of a dotted version that sorts like the version itself.
///
/// Every run of digits is prefixed with a byte holding the run's length, so a
/// longer number ("10") always sorts above a shorter one ("5") before the digits
/// themselves are compared. Non-digit bytes are copied through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionOrdinal(Vec<u8>);

impl VersionOrdinal {
    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encode `version` into its [`VersionOrdinal`].
///
/// Leading zeros of a digit run are dropped so "5.05" orders as "5.5".
///
/// # Panics
///
/// Panics if a digit run is longer than 255 characters; the length byte cannot
/// represent it and the caller has handed over something that is not a version.
pub fn version_ordinal(version: &str) -> VersionOrdinal {
    let mut vo: Vec<u8> = Vec::with_capacity(version.len() + 8);
    let mut run: Option<usize> = None;

    for &b in version.as_bytes() {
        if !b.is_ascii_digit() {
            vo.push(b);
            run = None;
            continue;
        }

        let j = match run {
            Some(j) => j,
            None => {
                vo.push(0);
                let j = vo.len() - 1;
                run = Some(j);
                j
            }
        };

        // a lone leading zero is replaced by the next digit
        if vo[j] == 1 && vo[j + 1] == b'0' {
            vo[j + 1] = b;
            continue;
        }

        assert!(
            vo[j] < u8::MAX,
            "version ordinal: digit run in {:?} exceeds {} characters",
            version,
            u8::MAX
        );
        vo.push(b);
        vo[j] += 1;
    }

    VersionOrdinal(vo)
}
