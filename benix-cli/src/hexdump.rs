use crate::config::DUMP_LINE_BYTES;

const HALF: usize = DUMP_LINE_BYTES / 2;

fn printable(byte: u8) -> char {
    if byte > 31 && byte < 126 { byte as char } else { '.' }
}

/// Format one line: hex for both halves, then the printable characters.
///
/// `41 42 .. | 49 4A .. |  | A B .. | I J .. | `
pub fn dump_line(chunk: &[u8]) -> String {
    let mut hex = String::new();
    let mut ascii = String::new();

    for half in chunk.chunks(HALF) {
        for &byte in half {
            hex.push_str(&format!("{byte:02X} "));
            ascii.push(printable(byte));
            ascii.push(' ');
        }
        hex.push_str("| ");
        ascii.push_str("| ");
    }

    format!("{hex} | {ascii}")
}

/// Dump lines for `data`, 16 bytes each.
pub fn hex_dump(data: &[u8]) -> impl Iterator<Item = String> + '_ {
    data.chunks(DUMP_LINE_BYTES).map(dump_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line() {
        let line = dump_line(b"ABCDEFGHIJKLMNOP");
        assert_eq!(
            line,
            "41 42 43 44 45 46 47 48 | 49 4A 4B 4C 4D 4E 4F 50 |  | \
             A B C D E F G H | I J K L M N O P | "
        );
    }

    #[test]
    fn test_unprintable_bytes_become_dots() {
        let mut raw = [0u8; 16];
        raw[1] = b' ';
        raw[2] = 0x7E;
        raw[3] = 0x7D;
        raw[4] = 0xFF;
        let line = dump_line(&raw);
        assert!(line.starts_with("00 20 7E 7D FF 00 00 00 | "));
        assert!(line.ends_with(" | .   . } . . . . | . . . . . . . . | "));
    }

    #[test]
    fn test_block_dump_line_count() {
        let block = [0u8; 1024];
        let lines: Vec<String> = hex_dump(&block).collect();
        assert_eq!(lines.len(), 64);
        assert!(lines.iter().all(|l| l == &lines[0]));
    }

    #[test]
    fn test_short_tail() {
        let lines: Vec<String> = hex_dump(b"0123456789").collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "30 31 32 33 34 35 36 37 | 38 39 |  | 0 1 2 3 4 5 6 7 | 8 9 | ");
    }
}
