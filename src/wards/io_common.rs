use chrono::NaiveDate;

pub fn date_stamp(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn combined_file_name(prefix: &str, date: &str) -> String {
    format!("{}{}.xlsx", prefix, date)
}

pub fn ward_file_name(prefix: &str, ward: &str, date: &str) -> String {
    format!("{}{}-{}.xlsx", prefix, ward, date)
}

/// Row numbers are 1-based and inclusive.
pub fn chunk_file_name(stem: &str, ward: &str, start: usize, end: usize) -> String {
    format!("{}-{}-Rows{}-{}.csv", stem, ward, start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 6).unwrap();
        let date = date_stamp(day);
        assert_eq!(date, "2025-02-06");
        assert_eq!(
            combined_file_name("AllWards-", &date),
            "AllWards-2025-02-06.xlsx"
        );
        assert_eq!(
            ward_file_name("City of ", "WARREN-WARD 1", &date),
            "City of WARREN-WARD 1-2025-02-06.xlsx"
        );
        assert_eq!(
            chunk_file_name("AllWards-2025-02-06", "WARREN-WARD 4", 2001, 2473),
            "AllWards-2025-02-06-WARREN-WARD 4-Rows2001-2473.csv"
        );
    }
}
