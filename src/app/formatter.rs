use crate::app::models::SelectedFile;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const OPEN_MARKER: &str = "<code>";
pub const CLOSE_MARKER: &str = "</code>";

/// Frames one file: path line, opening marker, contents, closing marker,
/// blank separator.
pub fn format_record(relative_path: &str, content: &str) -> String {
    format!("{relative_path}:\n{OPEN_MARKER}\n{content}\n{CLOSE_MARKER}\n\n")
}

/// Writes every readable selected file to `sink` and returns how many reached
/// it. Each record is flushed before it counts. Unreadable files are skipped;
/// a failing sink stops the batch and whatever was already flushed stays.
pub fn write_records<W: Write>(files: &[SelectedFile], sink: &mut W) -> usize {
    let mut written = 0;

    for file in files {
        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Error processing {}: {}", file.path.display(), err);
                continue;
            }
        };
        let content = String::from_utf8_lossy(&bytes);

        let record = format_record(&file.relative_path, &content);
        if let Err(err) = sink
            .write_all(record.as_bytes())
            .and_then(|()| sink.flush())
        {
            log::error!("Error writing to output: {}", err);
            return written;
        }
        written += 1;
        log::info!("Processed: {}", file.relative_path);
    }

    written
}

/// Creates (or truncates) `output` and writes the records into it. The file
/// is closed before this returns. Returns zero if it cannot be created.
pub fn write_output_file(files: &[SelectedFile], output: &Path) -> usize {
    let file = match File::create(output) {
        Ok(f) => f,
        Err(err) => {
            log::error!("Error writing to output file {}: {}", output.display(), err);
            return 0;
        }
    };
    let mut writer = BufWriter::new(file);
    write_records(files, &mut writer)
}
