pub mod config;
pub mod error;
pub mod parse;

pub use parse::Logbook;

/// Read and validate the logbook stored in `filename`
///
/// Diagnostics are accumulated in `errs`, the logbook is only returned
/// if none of them is fatal.
pub fn read_logbook(filename: &str, errs: &mut error::Record) -> Option<Logbook> {
    let contents = match std::fs::read_to_string(filename) {
        Ok(contents) => contents,
        Err(e) => {
            errs.make("File not found")
                .text(format!("Logbook loaded is '{}'", filename))
                .text(e)
                .hint("check the path or create the file");
            return None;
        }
    };
    let book = parse::extract(filename, errs, &contents);
    if errs.is_fatal() {
        None
    } else {
        Some(book)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file() {
        let mut errs = error::Record::new();
        assert!(read_logbook("/nonexistent/logbook.mlg", &mut errs).is_none());
        assert!(errs.is_fatal());
        assert_eq!(errs.labels().collect::<Vec<_>>(), vec!["File not found"]);
    }

    #[test]
    fn from_disk() {
        let path = std::env::temp_dir().join(format!("milelog-{}.mlg", std::process::id()));
        std::fs::write(
            &path,
            "vehicle civic { make \"Honda\" model \"Civic\" }\n2024: Jan: 05: odo civic 10;\n",
        )
        .unwrap();
        let mut errs = error::Record::new();
        let book = read_logbook(path.to_str().unwrap(), &mut errs);
        std::fs::remove_file(&path).unwrap();
        let book = book.unwrap();
        assert_eq!(book.vehicles.len(), 1);
        assert_eq!(book.entries.len(), 1);
    }
}
