use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// @module: File and directory utilities

// @const: printf-style integer placeholder ("%d", "%02d") or an escaped "%%"
static NUMBER_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%%|%(0?)(\d*)d").unwrap()
});

/// Characters that cannot appear in file names on common filesystems
const RESERVED_CHARS: [char; 9] = ['"', '?', '/', ':', '\\', '*', '<', '>', '|'];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Append an extension (".srt") to a path without replacing anything
    pub fn with_extension_appended<P: AsRef<Path>>(path: P, extension: &str) -> PathBuf {
        let mut os = path.as_ref().as_os_str().to_os_string();
        os.push(extension);
        PathBuf::from(os)
    }

    /// Make a title usable as a file name.
    ///
    /// Reserved characters become `_`, newlines and tabs become spaces, and
    /// trailing dots and surrounding whitespace are removed.
    pub fn clean_file_name(title: &str) -> String {
        let cleaned: String = title
            .chars()
            .map(|c| match c {
                c if RESERVED_CHARS.contains(&c) => '_',
                '\n' | '\t' => ' ',
                c => c,
            })
            .collect();

        cleaned.trim_end_matches('.').trim().to_string()
    }

    /// Expand the first integer placeholder of a name template.
    ///
    /// `"Abc %d"` gives `"Abc 1"`, `"Abc %02d"` gives `"Abc 01"`. Templates
    /// without a placeholder are returned unchanged.
    pub fn format_numbered_name(template: &str, number: usize) -> String {
        let mut substituted = false;
        NUMBER_PLACEHOLDER
            .replace_all(template, |caps: &Captures| {
                if &caps[0] == "%%" {
                    return "%".to_string();
                }
                if substituted {
                    return caps[0].to_string();
                }
                substituted = true;

                let width: usize = caps[2].parse().unwrap_or(0);
                if caps[1].is_empty() {
                    format!("{:>width$}", number, width = width)
                } else {
                    format!("{:0width$}", number, width = width)
                }
            })
            .into_owned()
    }

    /// Write bytes to a file and set both its access and modification time
    pub fn write_with_mtime<P: AsRef<Path>>(path: P, content: &[u8], mtime: DateTime<Utc>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", path))?;

        let time = SystemTime::from(mtime);
        file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
            .with_context(|| format!("Failed to set file times: {:?}", path))?;

        Ok(())
    }
}
