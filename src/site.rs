use crate::error::DashboardError;
use crate::types::Transaction;
use std::collections::BTreeSet;

/// Sorted, de-duplicated site identifiers, case preserved.
pub fn list_sites(data: &[Transaction]) -> Result<Vec<String>, DashboardError> {
    let sites: BTreeSet<&str> = data
        .iter()
        .filter_map(|r| r.site.as_deref())
        .filter(|s| !s.trim().is_empty())
        .collect();
    if sites.is_empty() {
        return Err(DashboardError::NoSites);
    }
    Ok(sites.into_iter().map(str::to_string).collect())
}

/// Records whose site matches `site` exactly.
pub fn select_site<'a>(
    data: &'a [Transaction],
    site: &str,
) -> Result<Vec<&'a Transaction>, DashboardError> {
    let rows: Vec<&Transaction> = data
        .iter()
        .filter(|r| r.site.as_deref() == Some(site))
        .collect();
    if rows.is_empty() {
        return Err(DashboardError::NoDataForSite(site.to_string()));
    }
    Ok(rows)
}

/// Sorted distinct customers present in a site's records.
pub fn customers_for_site(rows: &[&Transaction]) -> Vec<String> {
    let customers: BTreeSet<&str> = rows.iter().filter_map(|r| r.customer.as_deref()).collect();
    customers.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(site: Option<&str>, customer: &str) -> Transaction {
        Transaction {
            site: site.map(str::to_string),
            customer: Some(customer.to_string()),
            year: Some(2024),
            month: Some(1),
            period: None,
            amount: 1.0,
        }
    }

    #[test]
    fn sites_are_sorted_unique_and_case_preserved() {
        let data = vec![
            rec(Some("b"), "X"),
            rec(Some("A"), "X"),
            rec(Some("b"), "Y"),
            rec(None, "Z"),
            rec(Some("C"), "X"),
        ];
        assert_eq!(list_sites(&data).unwrap(), vec!["A", "C", "b"]);
    }

    #[test]
    fn no_sites_is_reported() {
        let data = vec![rec(None, "X")];
        assert_eq!(list_sites(&data), Err(DashboardError::NoSites));
        assert_eq!(list_sites(&[]), Err(DashboardError::NoSites));
    }

    #[test]
    fn select_site_matches_exactly() {
        let data = vec![rec(Some("A"), "X"), rec(Some("a"), "Y"), rec(Some("A"), "Z")];
        let rows = select_site(&data, "A").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            select_site(&data, "B").unwrap_err(),
            DashboardError::NoDataForSite("B".into())
        );
    }

    #[test]
    fn customers_are_sorted() {
        let data = vec![rec(Some("A"), "Zed"), rec(Some("A"), "Amy"), rec(Some("A"), "Zed")];
        let rows = select_site(&data, "A").unwrap();
        assert_eq!(customers_for_site(&rows), vec!["Amy", "Zed"]);
    }
}
