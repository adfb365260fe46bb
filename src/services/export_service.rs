use crate::models::influencer::InfluencerRecord;
use anyhow::Result;
use log::info;
use std::fs;
use std::path::Path;

/// Header row, fixed order. Extra transient fields on a record have no
/// column and are dropped by construction.
pub const CSV_FIELDS: [&str; 12] = [
    "platform",
    "username",
    "display_name",
    "url",
    "followers",
    "video_count",
    "relevance_score",
    "category",
    "description",
    "is_live",
    "email",
    "region",
];

/// Writes the record set as a CSV file, rebuilding it wholesale. An
/// empty record set writes nothing and is not an error.
pub fn export_to_csv(records: &[InfluencerRecord], path: &Path) -> Result<usize> {
    if records.is_empty() {
        info!("[Export] No influencers found, skipping CSV");
        return Ok(0);
    }

    let mut out = String::new();
    out.push_str(&CSV_FIELDS.join(","));
    out.push('\n');
    for record in records {
        out.push_str(&record_row(record));
        out.push('\n');
    }

    fs::write(path, out)?;
    info!(
        "[Export] {} influencers exported to {}",
        records.len(),
        path.display()
    );
    Ok(records.len())
}

/// Export filename derived from the search keyword.
pub fn export_filename(keyword: &str) -> String {
    format!("influencers_{}.csv", keyword.trim().replace(' ', "_"))
}

fn record_row(record: &InfluencerRecord) -> String {
    [
        escape(record.platform.as_str()),
        escape(&record.username),
        escape(&record.display_name),
        escape(&record.url),
        record.followers.to_string(),
        record.video_count.to_string(),
        format!("{:.1}", record.relevance_score),
        escape(&record.category),
        escape(&record.description),
        record.is_live.to_string(),
        escape(&record.email),
        escape(&record.region),
    ]
    .join(",")
}

// RFC 4180 quoting: wrap fields containing separators or quotes,
// doubling embedded quotes.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::influencer::Platform;
    use std::path::PathBuf;

    fn sample_record(description: &str) -> InfluencerRecord {
        InfluencerRecord {
            platform: Platform::YouTube,
            username: "UCabc".to_string(),
            display_name: "Jane Plays".to_string(),
            url: "https://youtube.com/channel/UCabc".to_string(),
            followers: 2000,
            video_count: 88,
            relevance_score: 5.0,
            category: "YouTube".to_string(),
            description: description.to_string(),
            is_live: false,
            email: "jane.doe@example.com".to_string(),
            region: "Global".to_string(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("creatorscout_{}_{}.csv", std::process::id(), name))
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let path = temp_path("empty");
        let written = export_to_csv(&[], &path).unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_input_leaves_existing_file_alone() {
        let path = temp_path("keep");
        fs::write(&path, "previous export").unwrap();
        export_to_csv(&[], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous export");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_matches_field_order() {
        let path = temp_path("header");
        export_to_csv(&[sample_record("plain bio")], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "platform,username,display_name,url,followers,video_count,relevance_score,category,description,is_live,email,region"
        );
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_row_round_trip() {
        let path = temp_path("roundtrip");
        export_to_csv(&[sample_record("plain bio")], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "YouTube,UCabc,Jane Plays,https://youtube.com/channel/UCabc,2000,88,5.0,YouTube,plain bio,false,jane.doe@example.com,Global"
        );
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_quoting_survives_commas_and_quotes() {
        let path = temp_path("quoting");
        export_to_csv(&[sample_record(r#"plays "hard", streams daily"#)], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.contains(r#""plays ""hard"", streams daily""#));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let path = temp_path("overwrite");
        export_to_csv(&[sample_record("first"), sample_record("second")], &path).unwrap();
        export_to_csv(&[sample_record("only")], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("gaming"), "influencers_gaming.csv");
        assert_eq!(
            export_filename(" retro gaming "),
            "influencers_retro_gaming.csv"
        );
    }
}
