const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Split a raw buffer into line records.
///
/// Records end at LF; a CR right before the LF is dropped. A last record with
/// no terminator is kept, but a trailing LF does not produce an empty record.
pub fn split_records(buf: &[u8]) -> Vec<&[u8]> {
    let mut records = Vec::with_capacity(count_lf(buf) + 1);
    let mut rest = buf;
    while !rest.is_empty() {
        let (line, next) = match rest.iter().position(|&b| b == LF) {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, &rest[rest.len()..]),
        };
        records.push(line.strip_suffix(&[CR]).unwrap_or(line));
        rest = next;
    }
    records
}

fn count_lf(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == LF).count()
}
