// Column mapping onto the fixed lead columns

use super::csv::CsvRecord;

/// One CSV row mapped onto the lead columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadRow {
    pub line: usize,
    pub name: String,
    pub phone: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub additional_phones: Vec<String>,
}

/// Where each lead column lives in the record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub first_name: Option<usize>,
    pub last_name: Option<usize>,
    pub phone: Option<usize>,
    pub company: Option<usize>,
    pub email: Option<usize>,
    pub additional_phones: Vec<usize>,
}

const NAME_HEADERS: &[&str] = &[
    "name",
    "fullname",
    "contactname",
    "contact",
    "leadname",
    "lead",
    "customername",
    "customer",
];
const FIRST_NAME_HEADERS: &[&str] = &["firstname", "first", "givenname", "fname"];
const LAST_NAME_HEADERS: &[&str] = &["lastname", "last", "surname", "familyname", "lname"];
const PHONE_HEADERS: &[&str] = &[
    "phone",
    "phonenumber",
    "phoneno",
    "telephone",
    "tel",
    "mobile",
    "mobilephone",
    "cell",
    "cellphone",
    "number",
    "primaryphone",
];
const COMPANY_HEADERS: &[&str] = &[
    "company",
    "companyname",
    "business",
    "businessname",
    "organization",
    "organisation",
    "org",
    "employer",
    "account",
];
const EMAIL_HEADERS: &[&str] = &["email", "emailaddress", "mail", "email1", "workemail"];
const ADDITIONAL_PHONE_HEADERS: &[&str] = &[
    "additionalphones",
    "additionalphone",
    "otherphones",
    "otherphone",
    "altphone",
    "alternatephone",
    "secondaryphone",
    "phone2",
    "phones",
];

/// Lowercase and drop everything except ASCII alphanumerics
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl ColumnMap {
    /// Fixed positional layout: name, phone, company, email, additional phones
    pub fn positional() -> Self {
        Self {
            name: Some(0),
            first_name: None,
            last_name: None,
            phone: Some(1),
            company: Some(2),
            email: Some(3),
            additional_phones: vec![4],
        }
    }

    /// Build a map from a header record
    ///
    /// Returns None when the record does not look like a header (no
    /// recognizable name or phone column).
    pub fn from_header(record: &CsvRecord) -> Option<Self> {
        let mut map = ColumnMap::default();

        for (idx, raw) in record.fields.iter().enumerate() {
            let key = normalize_header(raw);
            if key.is_empty() {
                continue;
            }

            if ADDITIONAL_PHONE_HEADERS.contains(&key.as_str()) {
                map.additional_phones.push(idx);
            } else if PHONE_HEADERS.contains(&key.as_str()) {
                if map.phone.is_none() {
                    map.phone = Some(idx);
                } else {
                    map.additional_phones.push(idx);
                }
            } else if NAME_HEADERS.contains(&key.as_str()) {
                map.name.get_or_insert(idx);
            } else if FIRST_NAME_HEADERS.contains(&key.as_str()) {
                map.first_name.get_or_insert(idx);
            } else if LAST_NAME_HEADERS.contains(&key.as_str()) {
                map.last_name.get_or_insert(idx);
            } else if COMPANY_HEADERS.contains(&key.as_str()) {
                map.company.get_or_insert(idx);
            } else if EMAIL_HEADERS.contains(&key.as_str()) {
                map.email.get_or_insert(idx);
            } else if key.contains("phone") || key.contains("mobile") || key.contains("cell") {
                // "work phone", "home phone", ...
                if map.phone.is_none() {
                    map.phone = Some(idx);
                } else {
                    map.additional_phones.push(idx);
                }
            }
        }

        let has_name = map.name.is_some() || map.first_name.is_some() || map.last_name.is_some();
        if has_name || map.phone.is_some() {
            Some(map)
        } else {
            None
        }
    }

    /// Map a data record onto lead columns
    pub fn apply(&self, record: &CsvRecord) -> LeadRow {
        let cell = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = match cell(self.name) {
            Some(full) => full,
            None => [cell(self.first_name), cell(self.last_name)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        };

        let additional_phones = self
            .additional_phones
            .iter()
            .filter_map(|&i| record.get(i))
            .flat_map(split_phones)
            .collect();

        LeadRow {
            line: record.line,
            name,
            phone: cell(self.phone).unwrap_or_default(),
            company: cell(self.company),
            email: cell(self.email),
            additional_phones,
        }
    }
}

/// Split a multi-phone cell on `;`, `|`, `/` and `,`
pub fn split_phones(cell: &str) -> Vec<String> {
    cell.split([';', '|', '/', ',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, fields: &[&str]) -> CsvRecord {
        CsvRecord {
            line,
            fields: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_header_synonyms() {
        let header = record(1, &["Full Name", "Phone Number", "Company Name", "E-mail", "Alt Phone"]);
        let map = ColumnMap::from_header(&header).unwrap();
        assert_eq!(map.name, Some(0));
        assert_eq!(map.phone, Some(1));
        assert_eq!(map.company, Some(2));
        assert_eq!(map.email, Some(3));
        assert_eq!(map.additional_phones, vec![4]);
    }

    #[test]
    fn test_first_last_name_joined() {
        let header = record(1, &["First Name", "Last Name", "Mobile"]);
        let map = ColumnMap::from_header(&header).unwrap();
        let row = map.apply(&record(2, &["Grace", "Hopper", "2125550100"]));
        assert_eq!(row.name, "Grace Hopper");
        assert_eq!(row.phone, "2125550100");
    }

    #[test]
    fn test_extra_phone_columns_become_additional() {
        let header = record(1, &["name", "work phone", "home phone"]);
        let map = ColumnMap::from_header(&header).unwrap();
        assert_eq!(map.phone, Some(1));
        assert_eq!(map.additional_phones, vec![2]);
    }

    #[test]
    fn test_data_row_is_not_header() {
        let first = record(1, &["Ada Lovelace", "2125550100", "Analytical Engines"]);
        assert!(ColumnMap::from_header(&first).is_none());
    }

    #[test]
    fn test_positional_apply() {
        let map = ColumnMap::positional();
        let row = map.apply(&record(
            1,
            &["Ada", "2125550100", "", "ada@example.com", "555-0101; 555-0102"],
        ));
        assert_eq!(row.company, None);
        assert_eq!(row.email.as_deref(), Some("ada@example.com"));
        assert_eq!(row.additional_phones, vec!["555-0101", "555-0102"]);
    }

    #[test]
    fn test_short_record_leaves_missing_columns_empty() {
        let row = ColumnMap::positional().apply(&record(3, &["Ada"]));
        assert_eq!(row.name, "Ada");
        assert!(row.phone.is_empty());
        assert!(row.additional_phones.is_empty());
    }
}
