// src/utils.rs

/// Normalize a data source name into a base filename
pub fn normalize_export_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Strip anything that could turn a filename into a path
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    replaced.trim().trim_start_matches('.').to_string()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Bytes to megabytes, rounded to two decimals
pub fn bytes_to_mb(bytes: usize) -> f64 {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    (mb * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_export_name() {
        assert_eq!(normalize_export_name("Job Applications"), "job_applications");
        assert_eq!(normalize_export_name("saved-jobs"), "saved-jobs");
        assert_eq!(normalize_export_name(" Contacts@CRM "), "contacts_crm");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("jobs.csv"), "jobs.csv");
        assert_eq!(sanitize_filename("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_filename("a\\b\n.csv"), "a_b_.csv");
        assert_eq!(sanitize_filename(".."), "");
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("take1.webm"), Some("webm".to_string()));
        assert_eq!(get_file_extension("Interview.MP4"), Some("mp4".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(150 * 1024 * 1024), 150.0);
        assert_eq!(bytes_to_mb(1024 * 1024 + 512 * 1024), 1.5);
        assert_eq!(bytes_to_mb(1), 0.0);
    }
}
