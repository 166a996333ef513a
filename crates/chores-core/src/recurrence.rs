use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use std::fmt::Debug;
use std::sync::Arc;

use crate::models::{MaterializationConfig, Periodical, RepeatCycle};

/// Source of "now" for horizon calculations.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant. Used by tests and by callers that need to
/// materialize as of a specific moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl RepeatCycle {
    /// Next occurrence after `at` for this cycle, preserving the time of day.
    ///
    /// Monthly steps use chrono's calendar arithmetic, which clamps to the last
    /// day of the target month (Jan 31 -> Feb 28). Returns `None` only when the
    /// result would fall outside chrono's representable range.
    #[inline]
    pub fn next_after(self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RepeatCycle::Daily => at.checked_add_days(Days::new(1)),
            RepeatCycle::Weekly => at.checked_add_days(Days::new(7)),
            RepeatCycle::Monthly => at.checked_add_months(Months::new(1)),
        }
    }

    /// Every cycle point strictly after `after`, in ascending order.
    pub fn occurrences_after(self, after: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
        std::iter::successors(self.next_after(after), move |current| self.next_after(*current))
    }
}

/// Last day of the month `months_ahead` calendar months after the month of `today`.
pub fn horizon_for(today: NaiveDate, months_ahead: u32) -> NaiveDate {
    let first_of_month = today.with_day(1).unwrap_or(today);
    first_of_month
        .checked_add_months(Months::new(months_ahead.saturating_add(1)))
        .and_then(|first_after| first_after.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// A chain stays open only while its repeat-end date lies strictly after the horizon.
#[inline]
pub fn is_chain_active(end_repeat_at: DateTime<Utc>, horizon: NaiveDate) -> bool {
    end_repeat_at.date_naive() > horizon
}

fn within_window(at: DateTime<Utc>, horizon: NaiveDate, until: DateTime<Utc>) -> bool {
    let date = at.date_naive();
    date <= horizon && date <= until.date_naive()
}

/// Dates for a brand-new chain: the head at `first`, then every cycle point up to
/// the horizon and the repeat-end date (both inclusive). The head is always present.
pub fn plan_chain(
    cycle: RepeatCycle,
    first: DateTime<Utc>,
    until: DateTime<Utc>,
    horizon: NaiveDate,
) -> Vec<DateTime<Utc>> {
    std::iter::once(first)
        .chain(cycle.occurrences_after(first).take_while(|at| within_window(*at, horizon, until)))
        .collect()
}

/// Dates to append to a chain whose latest surviving occurrence is at `latest`.
pub fn plan_extension(
    cycle: RepeatCycle,
    latest: DateTime<Utc>,
    until: DateTime<Utc>,
    horizon: NaiveDate,
) -> Vec<DateTime<Utc>> {
    cycle
        .occurrences_after(latest)
        .take_while(|at| within_window(*at, horizon, until))
        .collect()
}

impl Periodical {
    /// Half-open UTC range `[start, end)` of the calendar bucket containing `reference`.
    ///
    /// Weeks are ISO-8601 weeks: Monday through Sunday.
    pub fn bucket(self, reference: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = match self {
            Periodical::Daily => (reference, reference.succ_opt().unwrap_or(NaiveDate::MAX)),
            Periodical::Weekly => {
                let offset = u64::from(reference.weekday().num_days_from_monday());
                let monday = reference.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN);
                (monday, monday.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX))
            }
            Periodical::Monthly => {
                let first = reference.with_day(1).unwrap_or(reference);
                (first, first.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX))
            }
        };
        (start_of_day(start), start_of_day(end))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// MaterializationManager: owns the horizon policy and plans chain dates.
///
/// Responsibilities:
/// 1. Recompute the horizon from the clock on every call (never cached)
/// 2. Plan the dates of a new chain
/// 3. Plan the dates appended to an existing chain by the extension job
/// 4. Decide whether a chain is still open
#[derive(Debug, Clone)]
pub struct MaterializationManager {
    /// Configuration for materialization policies
    config: MaterializationConfig,
    clock: Arc<dyn Clock>,
}

impl MaterializationManager {
    /// Creates a new MaterializationManager on the system clock.
    pub fn new(config: MaterializationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a MaterializationManager reading time from `clock`.
    pub fn with_clock(config: MaterializationConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Creates a MaterializationManager with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MaterializationConfig::default())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Furthest date occurrences may currently be materialized up to.
    pub fn horizon(&self) -> NaiveDate {
        horizon_for(self.clock.now().date_naive(), self.config.horizon_months)
    }

    pub fn plan_chain(&self, cycle: RepeatCycle, first: DateTime<Utc>, until: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        plan_chain(cycle, first, until, self.horizon())
    }

    pub fn plan_extension(&self, cycle: RepeatCycle, latest: DateTime<Utc>, until: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        plan_extension(cycle, latest, until, self.horizon())
    }

    pub fn is_active(&self, end_repeat_at: DateTime<Utc>) -> bool {
        is_chain_active(end_repeat_at, self.horizon())
    }

    /// Gets the current configuration.
    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }

    /// Updates the configuration for this materialization manager.
    pub fn update_config(&mut self, config: MaterializationConfig) {
        self.config = config;
    }
}
