// Latest month vs prior month comparison for a site's top customers.
use crate::error::DashboardError;
use crate::period::Period;
use crate::types::{ComparisonCardRow, Transaction};
use crate::util::{format_currency, format_number};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of comparison cards shown per site.
pub const TOP_N: usize = 7;

/// Characters of the customer name shown on a card.
pub const CARD_NAME_CHARS: usize = 10;

/// Ordinal month-over-month rating, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    FourAlerts,
    ThreeAlerts,
    TwoAlerts,
    OneAlert,
    OneStar,
    TwoStars,
    ThreeStars,
    FourStars,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::FourStars => "⭐⭐⭐⭐",
            Rating::ThreeStars => "⭐⭐⭐",
            Rating::TwoStars => "⭐⭐",
            Rating::OneStar => "⭐",
            Rating::OneAlert => "🚨",
            Rating::TwoAlerts => "🚨🚨",
            Rating::ThreeAlerts => "🚨🚨🚨",
            Rating::FourAlerts => "🚨🚨🚨🚨",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Direction::Up => "green",
            Direction::Down => "red",
        }
    }
}

/// `(current - previous) / previous * 100`, or 0 when there is no base.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

pub fn rate(current: f64, previous: f64) -> Rating {
    if current > 0.0 {
        let pct = percent_change(current, previous);
        if pct > 50.0 {
            Rating::FourStars
        } else if pct >= 25.0 {
            Rating::ThreeStars
        } else if pct >= 5.0 {
            Rating::TwoStars
        } else if pct >= 0.0 {
            Rating::OneStar
        } else if pct >= -5.0 {
            Rating::OneAlert
        } else if pct >= -25.0 {
            Rating::TwoAlerts
        } else if pct >= -50.0 {
            Rating::ThreeAlerts
        } else {
            Rating::FourAlerts
        }
    } else if current > -5_000.0 {
        Rating::OneAlert
    } else if current >= -50_000.0 {
        Rating::TwoAlerts
    } else if current >= -100_000.0 {
        Rating::ThreeAlerts
    } else {
        // Both rungs below -100,000 (down to -500,000 and beyond) share the
        // top severity.
        Rating::FourAlerts
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub customer: String,
    pub current_amount: f64,
    pub previous_amount: f64,
    pub absolute_diff: f64,
    pub percent_diff: f64,
    pub direction: Direction,
    pub rating: Rating,
    pub current_period_label: String,
    pub previous_period_label: String,
}

/// The comparison panel: exactly `TOP_N` slots, blanks after the ranked ones.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCustomers {
    pub latest: Period,
    pub prior: Period,
    pub cards: [Option<ComparisonRecord>; TOP_N],
}

impl TopCustomers {
    pub fn ranked(&self) -> impl Iterator<Item = &ComparisonRecord> {
        self.cards.iter().flatten()
    }

    pub fn title(&self, site: &str) -> String {
        format!(
            "Site : {} - Top {} Customers Comparison - {}",
            site,
            TOP_N,
            self.latest.long_label()
        )
    }

    pub fn card_rows(&self, currency: &str) -> Vec<ComparisonCardRow> {
        self.cards
            .iter()
            .map(|card| match card {
                Some(c) => ComparisonCardRow {
                    customer: c.customer.chars().take(CARD_NAME_CHARS).collect(),
                    rating: c.rating.label().to_string(),
                    previous_month: c.previous_period_label.clone(),
                    previous: format_currency(c.previous_amount, currency),
                    current_month: c.current_period_label.clone(),
                    current: format_currency(c.current_amount, currency),
                    arrow: c.direction.arrow().to_string(),
                    pct: format!("{} %", format_number(c.percent_diff.abs(), 2)),
                    diff: format_currency(c.absolute_diff.abs(), currency),
                    color: c.direction.color().to_string(),
                },
                None => ComparisonCardRow {
                    customer: String::new(),
                    rating: String::new(),
                    previous_month: String::new(),
                    previous: String::new(),
                    current_month: String::new(),
                    current: String::new(),
                    arrow: String::new(),
                    pct: String::new(),
                    diff: String::new(),
                    color: "black".to_string(),
                },
            })
            .collect()
    }
}

/// Latest period in the rows and the one before it.
///
/// The prior period is the latest period strictly earlier in the data; when
/// the data has a single month, it is the calendar month before.
pub fn latest_and_prior(rows: &[&Transaction]) -> Result<(Period, Period), DashboardError> {
    let latest = rows
        .iter()
        .filter_map(|r| r.period)
        .max()
        .ok_or(DashboardError::NoValidPeriods)?;
    let prior = rows
        .iter()
        .filter_map(|r| r.period)
        .filter(|p| *p < latest)
        .max()
        .or_else(|| latest.months_back(1))
        .unwrap_or(latest);
    Ok((latest, prior))
}

/// Sum of amounts per customer for one period, ordered by customer name.
fn totals_for_period(rows: &[&Transaction], period: Period) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows.iter().filter(|r| r.period == Some(period)) {
        if let Some(customer) = r.customer.as_deref() {
            *totals.entry(customer).or_insert(0.0) += r.amount;
        }
    }
    totals
        .into_iter()
        .map(|(customer, total)| (customer.to_string(), total))
        .collect()
}

fn customer_total(rows: &[&Transaction], customer: &str, period: Period) -> f64 {
    rows.iter()
        .filter(|r| r.period == Some(period) && r.customer.as_deref() == Some(customer))
        .map(|r| r.amount)
        .sum()
}

/// Rank customers by latest-month revenue and compare each to the prior month.
pub fn compare_top_customers(rows: &[&Transaction]) -> Result<TopCustomers, DashboardError> {
    let (latest, prior) = latest_and_prior(rows)?;

    let mut ranking = totals_for_period(rows, latest);
    // `sort_by` is stable, so equal totals stay in name order.
    ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    debug!(
        latest = %latest,
        prior = %prior,
        customers = ranking.len(),
        "ranked latest-month customers"
    );

    let ranked: Vec<ComparisonRecord> = ranking
        .into_iter()
        .take(TOP_N)
        .map(|(customer, _)| {
            let current = customer_total(rows, &customer, latest);
            let previous = customer_total(rows, &customer, prior);
            ComparisonRecord {
                current_amount: current,
                previous_amount: previous,
                absolute_diff: current - previous,
                percent_diff: percent_change(current, previous),
                direction: if current > previous {
                    Direction::Up
                } else {
                    Direction::Down
                },
                rating: rate(current, previous),
                current_period_label: latest.short_label(),
                previous_period_label: prior.short_label(),
                customer,
            }
        })
        .collect();

    let cards = std::array::from_fn(|i| ranked.get(i).cloned());
    Ok(TopCustomers {
        latest,
        prior,
        cards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(customer: &str, year: i64, month: i64, amount: f64) -> Transaction {
        Transaction {
            site: Some("A".to_string()),
            customer: Some(customer.to_string()),
            year: Some(year as i32),
            month: Some(month as u32),
            period: Period::from_year_month(year, month),
            amount,
        }
    }

    fn refs(data: &[Transaction]) -> Vec<&Transaction> {
        data.iter().collect()
    }

    #[test]
    fn half_again_is_three_stars() {
        let data = vec![rec("X", 2024, 1, 1000.0), rec("X", 2024, 2, 1500.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        assert_eq!(top.latest, Period::from_year_month(2024, 2).unwrap());
        assert_eq!(top.prior, Period::from_year_month(2024, 1).unwrap());
        let x = top.cards[0].as_ref().unwrap();
        assert_eq!(x.current_amount, 1500.0);
        assert_eq!(x.previous_amount, 1000.0);
        assert_eq!(x.absolute_diff, 500.0);
        assert_eq!(x.percent_diff, 50.0);
        assert_eq!(x.rating, Rating::ThreeStars);
        assert_eq!(x.direction, Direction::Up);
        assert_eq!(x.current_period_label, "Feb-2024");
        assert_eq!(x.previous_period_label, "Jan-2024");
    }

    #[test]
    fn new_customer_gets_one_star() {
        let data = vec![rec("X", 2024, 1, 1000.0), rec("Y", 2024, 2, 200.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        let y = top.ranked().find(|c| c.customer == "Y").unwrap();
        assert_eq!(y.previous_amount, 0.0);
        assert_eq!(y.absolute_diff, 200.0);
        assert_eq!(y.percent_diff, 0.0);
        assert_eq!(y.rating, Rating::OneStar);
        // X had nothing in the latest month, so it is not ranked at all.
        assert_eq!(top.ranked().count(), 1);
    }

    #[test]
    fn single_month_falls_back_to_previous_calendar_month() {
        let data = vec![rec("X", 2024, 1, 300.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        assert_eq!(top.prior, Period::from_year_month(2023, 12).unwrap());
        let x = top.cards[0].as_ref().unwrap();
        assert_eq!(x.previous_amount, 0.0);
        assert_eq!(x.previous_period_label, "Dec-2023");
    }

    #[test]
    fn prior_skips_gaps_in_data() {
        let data = vec![rec("X", 2023, 10, 100.0), rec("X", 2024, 2, 100.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        assert_eq!(top.prior, Period::from_year_month(2023, 10).unwrap());
        assert_eq!(top.cards[0].as_ref().unwrap().rating, Rating::OneStar);
    }

    #[test]
    fn no_valid_periods_is_reported() {
        let mut r = rec("X", 2024, 1, 1.0);
        r.period = None;
        let data = vec![r];
        assert_eq!(
            compare_top_customers(&refs(&data)).unwrap_err(),
            DashboardError::NoValidPeriods
        );
    }

    #[test]
    fn ranking_uses_latest_month_only_and_pads_to_seven() {
        let data = vec![
            rec("Big", 2024, 1, 1_000_000.0),
            rec("Big", 2024, 2, 10.0),
            rec("Mid", 2024, 2, 500.0),
            rec("Mid", 2024, 2, 100.0),
            rec("Low", 2024, 2, 50.0),
        ];
        let top = compare_top_customers(&refs(&data)).unwrap();
        let names: Vec<&str> = top.ranked().map(|c| c.customer.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Low", "Big"]);
        assert_eq!(top.cards.len(), TOP_N);
        assert!(top.cards[3..].iter().all(Option::is_none));
        assert_eq!(top.ranked().next().unwrap().current_amount, 600.0);
    }

    #[test]
    fn ranking_keeps_only_seven_sorted_descending() {
        let data: Vec<Transaction> = (0..10)
            .map(|i| rec(&format!("C{}", i), 2024, 5, (i * 100) as f64))
            .collect();
        let top = compare_top_customers(&refs(&data)).unwrap();
        let amounts: Vec<f64> = top.ranked().map(|c| c.current_amount).collect();
        assert_eq!(amounts.len(), TOP_N);
        assert!(amounts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(amounts[0], 900.0);
    }

    #[test]
    fn ties_rank_alphabetically() {
        let data = vec![
            rec("Zeta", 2024, 2, 100.0),
            rec("Mid", 2024, 2, 250.0),
            rec("Alpha", 2024, 2, 60.0),
            rec("Alpha", 2024, 2, 40.0),
        ];
        let top = compare_top_customers(&refs(&data)).unwrap();
        let names: Vec<&str> = top.ranked().map(|c| c.customer.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn equal_months_point_down() {
        let data = vec![rec("X", 2024, 1, 100.0), rec("X", 2024, 2, 100.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        assert_eq!(top.cards[0].as_ref().unwrap().direction, Direction::Down);
    }

    #[test]
    fn positive_rating_buckets() {
        assert_eq!(rate(151.0, 100.0), Rating::FourStars);
        assert_eq!(rate(150.0, 100.0), Rating::ThreeStars);
        assert_eq!(rate(125.0, 100.0), Rating::ThreeStars);
        assert_eq!(rate(124.0, 100.0), Rating::TwoStars);
        assert_eq!(rate(105.0, 100.0), Rating::TwoStars);
        assert_eq!(rate(104.0, 100.0), Rating::OneStar);
        assert_eq!(rate(100.0, 100.0), Rating::OneStar);
        assert_eq!(rate(95.0, 100.0), Rating::OneAlert);
        assert_eq!(rate(94.0, 100.0), Rating::TwoAlerts);
        assert_eq!(rate(75.0, 100.0), Rating::TwoAlerts);
        assert_eq!(rate(74.0, 100.0), Rating::ThreeAlerts);
        assert_eq!(rate(50.0, 100.0), Rating::ThreeAlerts);
        assert_eq!(rate(49.0, 100.0), Rating::FourAlerts);
        assert_eq!(rate(10.0, 0.0), Rating::OneStar);
    }

    #[test]
    fn non_positive_rating_uses_current_value_only() {
        assert_eq!(rate(0.0, 100.0), Rating::OneAlert);
        assert_eq!(rate(-4_999.0, 0.0), Rating::OneAlert);
        assert_eq!(rate(-5_000.0, 0.0), Rating::TwoAlerts);
        assert_eq!(rate(-50_000.0, 1.0), Rating::TwoAlerts);
        assert_eq!(rate(-50_001.0, 1.0), Rating::ThreeAlerts);
        assert_eq!(rate(-100_000.0, 1.0), Rating::ThreeAlerts);
        assert_eq!(rate(-100_001.0, 1.0), Rating::FourAlerts);
        assert_eq!(rate(-600_000.0, 1.0), Rating::FourAlerts);
    }

    #[test]
    fn rating_never_worsens_as_current_grows() {
        for previous in [1.0, 250.0, 10_000.0] {
            let mut last = Rating::FourAlerts;
            let mut current = 0.5;
            while current < previous * 3.0 {
                let r = rate(current, previous);
                assert!(r >= last, "rate({}, {}) regressed", current, previous);
                last = r;
                current += previous / 37.0;
            }
        }
    }

    #[test]
    fn card_rows_format_amounts_and_blanks() {
        let data = vec![rec("X", 2024, 1, 2000.0), rec("X", 2024, 2, 1500.0)];
        let top = compare_top_customers(&refs(&data)).unwrap();
        let rows = top.card_rows("THB");
        assert_eq!(rows.len(), TOP_N);
        assert_eq!(rows[0].current, "1,500 THB");
        assert_eq!(rows[0].previous, "2,000 THB");
        assert_eq!(rows[0].diff, "500 THB");
        assert_eq!(rows[0].pct, "25.00 %");
        assert_eq!(rows[0].arrow, "▼");
        assert_eq!(rows[0].color, "red");
        assert_eq!(rows[0].rating, "🚨🚨");
        assert_eq!(rows[1].customer, "");
        assert_eq!(rows[1].color, "black");
        assert_eq!(
            top.title("A"),
            "Site : A - Top 7 Customers Comparison - February 2024"
        );
    }

    #[test]
    fn card_names_are_cut_to_ten_characters() {
        let data = vec![
            rec("Siam Cement Group", 2024, 2, 500.0),
            rec("Café Ñandú Co", 2024, 2, 100.0),
        ];
        let top = compare_top_customers(&refs(&data)).unwrap();
        let rows = top.card_rows("THB");
        assert_eq!(rows[0].customer, "Siam Cemen");
        assert_eq!(rows[1].customer, "Café Ñandú");
        assert_eq!(
            top.cards[0].as_ref().unwrap().customer,
            "Siam Cement Group"
        );
    }
}
