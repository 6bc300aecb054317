//! Assignment file writer.

use crate::error::WriteError;
use fpart_model::DeviceId;
use std::fmt::Write as _;
use std::path::Path;

/// Formats a complete assignment as `nodeId deviceId` lines in node order.
pub fn format_assignment(assignments: &[DeviceId]) -> String {
    let mut out = String::new();
    for (node, device) in assignments.iter().enumerate() {
        writeln!(out, "{node} {device}").expect("writing to a String cannot fail");
    }
    out
}

/// Writes a complete assignment to a file.
pub fn write_assignment(path: &Path, assignments: &[DeviceId]) -> Result<(), WriteError> {
    std::fs::write(path, format_assignment(assignments))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(id: u32) -> DeviceId {
        DeviceId::from_raw(id)
    }

    #[test]
    fn formats_in_node_order() {
        let text = format_assignment(&[dev(1), dev(0), dev(1)]);
        assert_eq!(text, "0 1\n1 0\n2 1\n");
    }

    #[test]
    fn empty_assignment_formats_empty() {
        assert_eq!(format_assignment(&[]), "");
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_assignment(&path, &[dev(0), dev(2)]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0 0\n1 2\n");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let err = write_assignment(Path::new("/nonexistent/dir/out.txt"), &[dev(0)]).unwrap_err();
        assert!(matches!(err, WriteError::Io(_)));
    }
}
