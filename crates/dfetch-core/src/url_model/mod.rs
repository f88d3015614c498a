//! Destination path derivation for named resources.

mod sanitize;

pub use sanitize::sanitize_resource_name;

use std::path::{Path, PathBuf};

/// Extension given to every downloaded file.
pub const FILE_EXTENSION: &str = "parquet";

/// File name for resource `name`: `<name>.parquet`.
pub fn destination_file_name(name: &str) -> String {
    format!("{}.{}", sanitize_resource_name(name), FILE_EXTENSION)
}

/// Full destination path: `<data_dir>/<name>.parquet`.
pub fn destination_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(destination_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_gets_parquet_extension() {
        assert_eq!(destination_file_name("sales_2024"), "sales_2024.parquet");
    }

    #[test]
    fn path_is_inside_data_dir() {
        let p = destination_path(Path::new("out"), "alpha");
        assert_eq!(p, Path::new("out").join("alpha.parquet"));
    }

    #[test]
    fn separators_cannot_escape_data_dir() {
        let p = destination_path(Path::new("out"), "../etc/passwd");
        assert_eq!(p.parent(), Some(Path::new("out")));
        assert_eq!(p.file_name().unwrap(), ".._etc_passwd.parquet");
    }
}
