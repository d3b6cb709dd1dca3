// ─── Binary String Scanner ───
// Extracts printable strings from an executable image, both narrow (ASCII)
// and wide (UTF-16LE) as emitted by Unreal Engine builds.

/// Shortest run of printable characters reported as a string.
pub const MIN_STRING_LEN: usize = 4;

fn is_printable(byte: u8) -> bool {
    byte == b'\t' || (0x20..=0x7e).contains(&byte)
}

/// Every narrow and wide run, ordered by the byte offset it starts at.
/// A narrow and a wide run starting at the same offset keep that order.
pub fn extract_strings(bytes: &[u8]) -> Vec<String> {
    let mut runs = extract_ascii(bytes);
    runs.extend(extract_utf16le(bytes));
    runs.sort_by_key(|(offset, _)| *offset);
    runs.into_iter().map(|(_, s)| s).collect()
}

type Run = (usize, String);

fn extract_ascii(bytes: &[u8]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &byte) in bytes.iter().enumerate() {
        match (is_printable(byte), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                push_run(&mut runs, s, &bytes[s..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push_run(&mut runs, s, &bytes[s..]);
    }

    runs
}

fn push_run(runs: &mut Vec<Run>, offset: usize, run: &[u8]) {
    if run.len() >= MIN_STRING_LEN {
        runs.push((offset, String::from_utf8_lossy(run).into_owned()));
    }
}

fn extract_utf16le(bytes: &[u8]) -> Vec<Run> {
    let mut runs = Vec::new();

    // Wide strings may start at either byte alignment.
    for alignment in 0..2 {
        let mut current = String::new();
        let mut start = alignment;
        let units = bytes.get(alignment..).unwrap_or_default().chunks_exact(2);

        for (i, unit) in units.enumerate() {
            let (lo, hi) = (unit[0], unit[1]);
            if hi == 0 && is_printable(lo) {
                if current.is_empty() {
                    start = alignment + i * 2;
                }
                current.push(lo as char);
            } else {
                flush_wide(&mut runs, start, &mut current);
            }
        }
        flush_wide(&mut runs, start, &mut current);
    }

    runs
}

fn flush_wide(runs: &mut Vec<Run>, offset: usize, current: &mut String) {
    if current.len() >= MIN_STRING_LEN {
        runs.push((offset, std::mem::take(current)));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn finds_narrow_strings_between_binary_noise() {
        let mut bytes = vec![0u8, 1, 2];
        bytes.extend_from_slice(b"++Fortnite+Release-11.40-CL-12345");
        bytes.extend_from_slice(&[0xff, 0x00, b'a', b'b', 0x00]);
        bytes.extend_from_slice(b"tail");

        let strings = extract_strings(&bytes);
        assert_eq!(strings[0], "++Fortnite+Release-11.40-CL-12345");
        assert!(strings.contains(&"tail".to_string()));
        assert!(!strings.contains(&"ab".to_string()));
    }

    #[test]
    fn finds_wide_strings_at_odd_offsets() {
        let mut bytes = vec![0xffu8];
        bytes.extend(wide("++Fortnite+Release-Cert-CL-3807424"));
        bytes.extend_from_slice(&[0xff, 0xff]);

        let strings = extract_strings(&bytes);
        assert!(strings.contains(&"++Fortnite+Release-Cert-CL-3807424".to_string()));
    }

    #[test]
    fn strings_come_out_in_file_order_across_encodings() {
        let mut bytes = vec![0xffu8, 0xff];
        bytes.extend(wide("++Fortnite+Release-4.5-CL-4159770"));
        bytes.extend_from_slice(&[0xff, 0xff]);
        bytes.extend_from_slice(b"++Fortnite+Release-11.40-CL-12345");
        bytes.push(0xff);

        let strings = extract_strings(&bytes);
        assert_eq!(
            strings,
            [
                "++Fortnite+Release-4.5-CL-4159770",
                "++Fortnite+Release-11.40-CL-12345",
            ]
        );
    }

    #[test]
    fn empty_input_has_no_strings() {
        assert!(extract_strings(&[]).is_empty());
        assert!(extract_strings(&[0x00]).is_empty());
    }
}
