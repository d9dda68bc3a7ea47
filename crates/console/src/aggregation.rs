//! Period reports derived from the mirror: history, expense ledger, sales.

use chrono::{Datelike, NaiveDate};

use zbalo_records::{CropCycle, ExpenseRecord, MaintenanceEvent, SaleRecord};

use crate::store::Snapshot;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jun", "Jul", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

const TOP_PRODUCTS: usize = 6;
const EVENT_TYPES: usize = 8;
const MISSING_KEY: &str = "—";

/// A year and, optionally, one month of it (0 = January).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Undated records belong to no period.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| d.year() == self.year && self.month.is_none_or(|m| d.month0() == m))
    }
}

/// Parallel labels and values, ready for a chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        let (labels, values) = pairs.into_iter().unzip();
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels.iter().position(|l| l == label).map(|i| self.values[i])
    }
}

/// Sums per key, keys kept in first-seen order.
fn group_sum<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> f64,
) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    for item in items {
        let k = match key(item) {
            "" => MISSING_KEY,
            k => k,
        };
        match groups.iter_mut().find(|(g, _)| g == k) {
            Some((_, sum)) => *sum += value(item),
            None => groups.push((k.to_string(), value(item))),
        }
    }
    groups
}

/// Largest group; the first one seen wins a tie.
fn largest(groups: Vec<(String, f64)>) -> Option<(String, f64)> {
    let mut best: Option<(String, f64)> = None;
    for (k, v) in groups {
        if best.as_ref().is_none_or(|(_, b)| v > *b) {
            best = Some((k, v));
        }
    }
    best
}

/// Distinct years of `dates` plus `current_year`, newest first.
pub fn year_options(dates: impl IntoIterator<Item = Option<NaiveDate>>, current_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = dates.into_iter().flatten().map(|d| d.year()).collect();
    years.push(current_year);
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// The chosen year, or the most recent option.
pub fn selected_year(options: &[i32], chosen: Option<i32>) -> Option<i32> {
    chosen.or_else(|| options.first().copied())
}

pub fn revenue<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>) -> f64 {
    sales.into_iter().map(SaleRecord::revenue).sum()
}

pub fn labour_hours<'a>(events: impl IntoIterator<Item = &'a MaintenanceEvent>) -> f64 {
    events.into_iter().map(MaintenanceEvent::hours).sum()
}

/// Revenue per month of `year`, January first.
pub fn monthly_revenue(sales: &[SaleRecord], year: i32) -> [f64; 12] {
    let mut months = [0.0; 12];
    for sale in sales {
        if let Some(date) = sale.date.filter(|d| d.year() == year) {
            months[date.month0() as usize] += sale.revenue();
        }
    }
    months
}

pub fn status_distribution<'a>(crops: impl IntoIterator<Item = &'a CropCycle>) -> Series {
    Series::from_pairs(group_sum(crops, CropCycle::status, |_| 1.0))
}

/// Event counts per maintenance type, at most the first eight types seen.
pub fn event_type_distribution<'a>(events: impl IntoIterator<Item = &'a MaintenanceEvent>) -> Series {
    let mut groups = group_sum(events, MaintenanceEvent::event_type, |_| 1.0);
    groups.truncate(EVENT_TYPES);
    Series::from_pairs(groups)
}

/// Products by summed revenue, best six first.
pub fn top_products<'a>(sales: impl IntoIterator<Item = &'a SaleRecord>) -> Series {
    let mut groups = group_sum(sales, |s: &SaleRecord| s.product.as_str(), SaleRecord::revenue);
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups.truncate(TOP_PRODUCTS);
    Series::from_pairs(groups)
}

pub fn top_expense_category<'a>(expenses: impl IntoIterator<Item = &'a ExpenseRecord>) -> Option<(String, f64)> {
    largest(group_sum(expenses, ExpenseRecord::category, ExpenseRecord::amount))
}

/// Totals over one collection of sales.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SalesSummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

impl SalesSummary {
    pub fn of(sales: &[SaleRecord]) -> Self {
        let total = revenue(sales);
        let count = sales.len();
        let average = if count == 0 { 0.0 } else { total / count as f64 };
        Self {
            total,
            count,
            average,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReport {
    pub period: Period,
    pub crop_count: usize,
    pub revenue: f64,
    pub sale_count: usize,
    pub labour_hours: f64,
    /// Whole selected year, month filter ignored.
    pub monthly_revenue: [f64; 12],
    pub statuses: Series,
    pub event_types: Series,
    pub top_products: Series,
    pub crops: Vec<CropCycle>,
    pub maintenance: Vec<MaintenanceEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub year: i32,
    pub month: Option<u32>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReport {
    pub filter: LedgerFilter,
    pub total_expenses: f64,
    /// Sales revenue for the whole year, month and category filters ignored.
    pub total_sales: f64,
    pub balance: f64,
    pub top_category: Option<(String, f64)>,
    /// Filtered expenses, newest first.
    pub rows: Vec<ExpenseRecord>,
}

/// Read-only reports over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AggregationEngine<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Years offered by the history report: sale and crop years.
    pub fn history_years(&self, current_year: i32) -> Vec<i32> {
        let sales = self.snapshot.sales.iter().map(|s| s.date);
        let crops = self.snapshot.crops.iter().map(|c| c.start_date);
        year_options(sales.chain(crops), current_year)
    }

    /// Years offered by the expense ledger.
    pub fn ledger_years(&self, current_year: i32) -> Vec<i32> {
        year_options(self.snapshot.expenses.iter().map(|e| e.date), current_year)
    }

    pub fn history(&self, period: Period) -> HistoryReport {
        let sales: Vec<&SaleRecord> = self.snapshot.sales.iter().filter(|s| period.contains(s.date)).collect();
        let crops: Vec<CropCycle> = self
            .snapshot
            .crops
            .iter()
            .filter(|c| period.contains(c.start_date))
            .cloned()
            .collect();
        let maintenance: Vec<MaintenanceEvent> = self
            .snapshot
            .maintenance
            .iter()
            .filter(|e| period.contains(e.date))
            .cloned()
            .collect();

        HistoryReport {
            period,
            crop_count: crops.len(),
            revenue: revenue(sales.iter().copied()),
            sale_count: sales.len(),
            labour_hours: labour_hours(&maintenance),
            monthly_revenue: monthly_revenue(&self.snapshot.sales, period.year),
            statuses: status_distribution(&crops),
            event_types: event_type_distribution(&maintenance),
            top_products: top_products(sales.iter().copied()),
            crops,
            maintenance,
        }
    }

    pub fn ledger(&self, filter: LedgerFilter) -> LedgerReport {
        let period = Period {
            year: filter.year,
            month: filter.month,
        };
        let mut rows: Vec<ExpenseRecord> = self
            .snapshot
            .expenses
            .iter()
            .filter(|e| period.contains(e.date))
            .filter(|e| filter.category.as_deref().is_none_or(|c| e.category() == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));

        let total_expenses: f64 = rows.iter().map(ExpenseRecord::amount).sum();
        let year = Period::year(filter.year);
        let total_sales = revenue(self.snapshot.sales.iter().filter(|s| year.contains(s.date)));

        LedgerReport {
            top_category: top_expense_category(&rows),
            total_expenses,
            total_sales,
            balance: total_sales - total_expenses,
            rows,
            filter,
        }
    }

    pub fn sales_summary(&self) -> SalesSummary {
        SalesSummary::of(&self.snapshot.sales)
    }
}
