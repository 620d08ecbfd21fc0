//! Directory listing rows for LIST and NLST.
//!
//! LIST rows follow the long Unix format clients parse: type and triad,
//! link count, owner, group, size, modification time and name.

use std::io::{self, Write};
use std::net::TcpStream;

use chrono::{DateTime, Utc};

use crate::backend::FileStatus;
use crate::file_object::DfsFileObject;
use crate::path;

/// Formats one long-listing row from backend metadata.
pub fn format_entry(status: &FileStatus, link_count: u32, name: &str) -> String {
    let type_char = if status.is_dir() { 'd' } else { '-' };
    let modified = DateTime::<Utc>::from_timestamp_millis(status.modified_ms as i64)
        .map(|dt| dt.format("%b %d %H:%M").to_string())
        .unwrap_or_else(|| "Jan 01 00:00".to_string());
    format!(
        "{}{} {:>3} {:<8} {:<8} {:>12} {} {}",
        type_char, status.permissions, link_count, status.owner, status.group, status.length,
        modified, name
    )
}

/// Formats the row for one adapter file object. Entries whose metadata
/// cannot be fetched are shown with blank ownership and zero size rather
/// than dropped, so the listing length always matches the directory.
pub fn format_list_entry(file: &DfsFileObject) -> String {
    match file.status() {
        Some(status) => format_entry(&status, file.link_count(), file.name()),
        None => format!(
            "-{} {:>3} {:<8} {:<8} {:>12} Jan 01 00:00 {}",
            "---------",
            1,
            "",
            "",
            0,
            file.name()
        ),
    }
}

/// Short name for an NLST row.
pub fn format_name_entry(file: &DfsFileObject) -> String {
    path::file_name(file.absolute_path()).to_string()
}

/// Writes listing rows over the data connection, one per line.
pub fn send_listing(data_stream: &mut TcpStream, rows: &[String]) -> io::Result<()> {
    for row in rows {
        data_stream.write_all(row.as_bytes())?;
        data_stream.write_all(b"\r\n")?;
    }
    data_stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FileKind;

    fn status(kind: FileKind, triad: &str, length: u64, modified_ms: u64) -> FileStatus {
        FileStatus {
            path: "/data/ftp/alice/report.csv".to_string(),
            kind,
            owner: "alice".to_string(),
            group: "staff".to_string(),
            permissions: triad.to_string(),
            length,
            modified_ms,
        }
    }

    #[test]
    fn file_row_carries_all_columns() {
        let row = format_entry(&status(FileKind::File, "rw-r--r--", 1234, 0), 1, "report.csv");
        assert_eq!(
            row,
            "-rw-r--r--   1 alice    staff            1234 Jan 01 00:00 report.csv"
        );
    }

    #[test]
    fn directory_row_starts_with_d() {
        let row = format_entry(&status(FileKind::Directory, "rwxr-x---", 0, 0), 3, "reports");
        assert!(row.starts_with("drwxr-x---   3 "));
        assert!(row.ends_with(" reports"));
    }

    #[test]
    fn timestamps_render_month_day_time() {
        let row = format_entry(&status(FileKind::File, "rw-r--r--", 9, 86_400_000), 1, "x");
        assert!(row.contains("Jan 02 00:00"));
    }
}
