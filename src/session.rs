// Per-session selection state, passed explicitly into every request.
use crate::error::DashboardError;
use crate::period::Period;
use crate::site::{customers_for_site, list_sites, select_site};
use crate::types::Transaction;
use tracing::info;

/// Identity of a loaded dataset; a change resets the site selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSignature {
    pub sites: Vec<String>,
    pub min_period: Option<Period>,
    pub max_period: Option<Period>,
}

impl DataSignature {
    pub fn of(data: &[Transaction], sites: Vec<String>) -> Self {
        let periods = || data.iter().filter_map(|r| r.period);
        DataSignature {
            sites,
            min_period: periods().min(),
            max_period: periods().max(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selected_site: Option<String>,
    pub selected_customers: Vec<String>,
    signature: Option<DataSignature>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the selection with the dataset and return the site list.
    ///
    /// A new dataset (different signature) or a site that is no longer listed
    /// moves the selection to the first site.
    pub fn sync(&mut self, data: &[Transaction]) -> Result<Vec<String>, DashboardError> {
        let sites = list_sites(data)?;
        let signature = DataSignature::of(data, sites.clone());
        if self.signature.as_ref() != Some(&signature) {
            info!(
                sites = signature.sites.len(),
                min_period = ?signature.min_period,
                max_period = ?signature.max_period,
                "dataset changed, resetting site selection"
            );
            self.signature = Some(signature);
            self.set_site(data, &sites[0]);
        }
        let listed = self
            .selected_site
            .as_ref()
            .map_or(false, |s| sites.contains(s));
        if !listed {
            self.set_site(data, &sites[0]);
        }
        Ok(sites)
    }

    /// Select a site and reset the customer selection to its default.
    pub fn set_site(&mut self, data: &[Transaction], site: &str) {
        self.selected_site = Some(site.to_string());
        self.selected_customers = select_site(data, site)
            .map(|rows| customers_for_site(&rows))
            .unwrap_or_default()
            .into_iter()
            .take(1)
            .collect();
    }

    /// Select a site by name, refusing one the data does not list.
    ///
    /// On refusal the current selection is left as it was.
    pub fn choose_site(&mut self, data: &[Transaction], site: &str) -> Result<(), DashboardError> {
        if !list_sites(data)?.iter().any(|s| s == site) {
            return Err(DashboardError::NoDataForSite(site.to_string()));
        }
        self.set_site(data, site);
        Ok(())
    }

    pub fn set_customers(&mut self, customers: Vec<String>) {
        self.selected_customers = customers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(site: &str, customer: &str, year: i64, month: i64) -> Transaction {
        Transaction {
            site: Some(site.to_string()),
            customer: Some(customer.to_string()),
            year: Some(year as i32),
            month: Some(month as u32),
            period: Period::from_year_month(year, month),
            amount: 1.0,
        }
    }

    #[test]
    fn first_sync_selects_first_site_and_customer() {
        let data = vec![rec("B", "Q", 2024, 1), rec("A", "Z", 2024, 1), rec("A", "M", 2024, 2)];
        let mut session = Session::new();
        let sites = session.sync(&data).unwrap();
        assert_eq!(sites, vec!["A", "B"]);
        assert_eq!(session.selected_site.as_deref(), Some("A"));
        assert_eq!(session.selected_customers, vec!["M"]);
    }

    #[test]
    fn selection_survives_resync_of_same_data() {
        let data = vec![rec("A", "X", 2024, 1), rec("B", "Y", 2024, 1)];
        let mut session = Session::new();
        session.sync(&data).unwrap();
        session.set_site(&data, "B");
        session.set_customers(vec!["Y".into(), "Other".into()]);
        session.sync(&data).unwrap();
        assert_eq!(session.selected_site.as_deref(), Some("B"));
        assert_eq!(session.selected_customers.len(), 2);
    }

    #[test]
    fn new_data_resets_selection() {
        let first = vec![rec("A", "X", 2024, 1), rec("B", "Y", 2024, 1)];
        let second = vec![rec("A", "X", 2024, 1), rec("B", "Y", 2024, 3)];
        let mut session = Session::new();
        session.sync(&first).unwrap();
        session.set_site(&first, "B");
        session.sync(&second).unwrap();
        assert_eq!(session.selected_site.as_deref(), Some("A"));
    }

    #[test]
    fn sync_without_sites_fails() {
        let mut session = Session::new();
        assert_eq!(session.sync(&[]), Err(DashboardError::NoSites));
    }

    #[test]
    fn unknown_site_is_refused_and_selection_kept() {
        let data = vec![rec("A", "X", 2024, 1), rec("B", "Y", 2024, 1)];
        let mut session = Session::new();
        session.sync(&data).unwrap();
        session.set_customers(vec!["X".into()]);
        assert_eq!(
            session.choose_site(&data, "Nope"),
            Err(DashboardError::NoDataForSite("Nope".into()))
        );
        assert_eq!(session.selected_site.as_deref(), Some("A"));
        assert_eq!(session.selected_customers, vec!["X"]);
    }

    #[test]
    fn chosen_site_and_customers_survive_sync() {
        let data = vec![rec("A", "X", 2024, 1), rec("B", "Y", 2024, 1)];
        let mut session = Session::new();
        session.sync(&data).unwrap();
        session.choose_site(&data, "B").unwrap();
        session.set_customers(vec!["Q".into()]);
        session.sync(&data).unwrap();
        assert_eq!(session.selected_site.as_deref(), Some("B"));
        assert_eq!(session.selected_customers, vec!["Q"]);
    }
}
