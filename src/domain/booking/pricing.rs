use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{BookingIssue, CostComponent, Evaluation};

use super::{Currency, Money, ServiceCatalog, ServiceKey};

/// 予約内容
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub duration_hours: i64,
    pub hourly_base_rate: f64,
    #[serde(default)]
    pub selected_services: BTreeSet<ServiceKey>,
}

impl BookingRequest {
    pub fn new(date: NaiveDate, duration_hours: i64, hourly_base_rate: f64) -> Self {
        Self {
            date,
            duration_hours,
            hourly_base_rate,
            selected_services: BTreeSet::new(),
        }
    }

    pub fn with_service<K: Into<ServiceKey>>(mut self, key: K) -> Self {
        self.selected_services.insert(key.into());
        self
    }
}

/// 料金の内訳
///
/// 金額は全て丸める前の値。
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub base_cost: f64,
    pub services_cost: f64,
    pub is_weekend: bool,
    pub discount_amount: f64,
    pub discount_applies: bool,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn zero() -> Self {
        Self {
            base_cost: 0.0,
            services_cost: 0.0,
            is_weekend: false,
            discount_amount: 0.0,
            discount_applies: false,
            total_cost: 0.0,
        }
    }

    pub fn base(&self, currency: Currency) -> Money {
        Money::new(self.base_cost, currency)
    }

    pub fn services(&self, currency: Currency) -> Money {
        Money::new(self.services_cost, currency)
    }

    pub fn discount(&self, currency: Currency) -> Money {
        Money::new(self.discount_amount, currency)
    }

    pub fn total(&self, currency: Currency) -> Money {
        Money::new(self.total_cost, currency)
    }
}

/// 料金規則
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// 週末の基本料金への割増率
    pub weekend_surcharge: f64,
    /// 長時間利用の割引率
    pub long_duration_discount: f64,
    /// 割引が適用される最短時間
    pub discount_min_hours: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            weekend_surcharge: 0.20,
            long_duration_discount: 0.10,
            discount_min_hours: 3,
        }
    }
}

impl PricingPolicy {
    fn validate(&self) -> Result<(), PolicyError> {
        if !(self.weekend_surcharge.is_finite() && self.weekend_surcharge >= 0.0) {
            return Err(PolicyError::InvalidSurcharge {
                rate: self.weekend_surcharge,
            });
        }
        if !(0.0..=1.0).contains(&self.long_duration_discount) {
            return Err(PolicyError::InvalidDiscount {
                rate: self.long_duration_discount,
            });
        }
        if self.discount_min_hours < 1 {
            return Err(PolicyError::InvalidDiscountThreshold {
                hours: self.discount_min_hours,
            });
        }
        Ok(())
    }
}

#[derive(Display, Debug, Error, Clone, Copy, PartialEq)]
pub enum PolicyError {
    #[display(fmt = "Weekend surcharge must be a non-negative rate, got {}", rate)]
    InvalidSurcharge { rate: f64 },
    #[display(fmt = "Discount must be between 0 and 1, got {}", rate)]
    InvalidDiscount { rate: f64 },
    #[display(fmt = "Discount threshold must be at least one hour, got {}", hours)]
    InvalidDiscountThreshold { hours: i64 },
}

/// 料金計算
#[derive(Clone, Debug, Default)]
pub struct PricingEngine {
    policy: PricingPolicy,
}

impl PricingEngine {
    pub fn new(policy: PricingPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// 料金の内訳を計算する
    ///
    /// 不正な入力でも失敗せず、全て0の内訳とエラー診断を返す。
    /// カタログにないサービスは0円として警告を付ける。
    pub fn compute_cost_breakdown(
        &self,
        request: &BookingRequest,
        catalog: &ServiceCatalog,
    ) -> Evaluation<CostBreakdown> {
        let mut issues = Self::validate_request(request);
        if !issues.is_empty() {
            warn!(?issues, "invalid booking request");
            return Evaluation::new(CostBreakdown::zero(), issues);
        }

        let is_weekend = is_weekend(request.date);
        let mut base_cost = request.hourly_base_rate * request.duration_hours as f64;
        if is_weekend {
            base_cost *= 1.0 + self.policy.weekend_surcharge;
        }

        let mut services_cost = 0.0;
        for key in &request.selected_services {
            match catalog.price_of(key) {
                Some(price) => services_cost += price,
                None => {
                    warn!(%key, "unknown service key is priced at zero");
                    issues.push(BookingIssue::UnknownServiceKey { key: key.clone() });
                }
            }
        }

        if let Some(component) = overflowed(base_cost, services_cost) {
            issues.push(BookingIssue::CostOverflow { component });
            warn!(?issues, "booking cost overflowed");
            return Evaluation::new(CostBreakdown::zero(), issues);
        }

        let mut total_cost = base_cost + services_cost;
        let discount_applies =
            request.duration_hours >= self.policy.discount_min_hours && !is_weekend;
        let discount_amount = match discount_applies {
            true => {
                let discount_amount = total_cost * self.policy.long_duration_discount;
                total_cost *= 1.0 - self.policy.long_duration_discount;
                discount_amount
            }
            false => 0.0,
        };

        let breakdown = CostBreakdown {
            base_cost,
            services_cost,
            is_weekend,
            discount_amount,
            discount_applies,
            total_cost,
        };
        debug!(date = %request.date, hours = request.duration_hours, ?breakdown, "computed cost breakdown");
        Evaluation::new(breakdown, issues)
    }

    fn validate_request(request: &BookingRequest) -> Vec<BookingIssue> {
        let mut issues = Vec::new();
        if request.duration_hours < 1 {
            issues.push(BookingIssue::InvalidDuration {
                hours: request.duration_hours,
            });
        }
        if !(request.hourly_base_rate.is_finite() && request.hourly_base_rate >= 0.0) {
            issues.push(BookingIssue::InvalidRate {
                rate: request.hourly_base_rate,
            });
        }
        issues
    }
}

/// 有限でなくなった最初の項目
fn overflowed(base_cost: f64, services_cost: f64) -> Option<CostComponent> {
    if !base_cost.is_finite() {
        Some(CostComponent::Base)
    } else if !services_cost.is_finite() {
        Some(CostComponent::Services)
    } else if !(base_cost + services_cost).is_finite() {
        Some(CostComponent::Total)
    } else {
        None
    }
}

/// 土曜日と日曜日を週末とする
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::AddOnService;

    // 2024-06-05 は水曜日、2024-06-08 は土曜日
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::try_from_services([
            AddOnService::create("floodlights".into(), "Floodlights".to_owned(), 300.0).unwrap(),
            AddOnService::create("referee".into(), "Referee".to_owned(), 500.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_weekday_long_booking_is_discounted() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 4, 1000.0);
        let evaluation = engine.compute_cost_breakdown(&request, &ServiceCatalog::new());
        let breakdown = evaluation.value();
        assert!(evaluation.issues().is_empty());
        assert!(!breakdown.is_weekend);
        assert_eq!(breakdown.base_cost, 4000.0);
        assert_eq!(breakdown.services_cost, 0.0);
        assert!(breakdown.discount_applies);
        assert_eq!(breakdown.discount_amount, 400.0);
        assert_eq!(breakdown.total_cost, 3600.0);
    }

    #[test]
    fn test_saturday_booking_has_surcharge_and_no_discount() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(saturday(), 2, 1000.0).with_service("floodlights");
        let breakdown = *engine.compute_cost_breakdown(&request, &catalog()).value();
        assert!(breakdown.is_weekend);
        assert_eq!(breakdown.base_cost, 2400.0);
        assert_eq!(breakdown.services_cost, 300.0);
        assert!(!breakdown.discount_applies);
        assert_eq!(breakdown.discount_amount, 0.0);
        assert_eq!(breakdown.total_cost, 2700.0);
    }

    #[test]
    fn test_weekend_never_discounts() {
        let engine = PricingEngine::default();
        for date in [saturday(), sunday()] {
            for hours in 1..=8 {
                let request = BookingRequest::new(date, hours, 750.0);
                let breakdown = *engine.compute_cost_breakdown(&request, &catalog()).value();
                assert!(breakdown.is_weekend);
                assert_eq!(breakdown.base_cost, 750.0 * hours as f64 * 1.20);
                assert!(!breakdown.discount_applies);
            }
        }
    }

    #[test]
    fn test_weekday_discount_threshold() {
        let engine = PricingEngine::default();
        for hours in 1..=8 {
            let request = BookingRequest::new(wednesday(), hours, 1200.0)
                .with_service("floodlights")
                .with_service("referee");
            let breakdown = *engine.compute_cost_breakdown(&request, &catalog()).value();
            assert_eq!(breakdown.discount_applies, hours >= 3);
            if hours >= 3 {
                assert_eq!(
                    breakdown.total_cost,
                    0.90 * (breakdown.base_cost + breakdown.services_cost)
                );
            } else {
                assert_eq!(
                    breakdown.total_cost,
                    breakdown.base_cost + breakdown.services_cost
                );
            }
        }
    }

    #[test]
    fn test_identical_input_gives_identical_output() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 3, 999.99).with_service("referee");
        let first = engine.compute_cost_breakdown(&request, &catalog());
        let second = engine.compute_cost_breakdown(&request, &catalog());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_service_is_free_with_warning() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 1, 1000.0)
            .with_service("floodlights")
            .with_service("drinks");
        let evaluation = engine.compute_cost_breakdown(&request, &catalog());
        assert_eq!(evaluation.value().services_cost, 300.0);
        assert_eq!(evaluation.value().total_cost, 1300.0);
        assert!(!evaluation.has_errors());
        assert_eq!(
            evaluation.issues(),
            &[BookingIssue::UnknownServiceKey {
                key: "drinks".into()
            }]
        );
    }

    #[test]
    fn test_invalid_duration_returns_zero_breakdown() {
        let engine = PricingEngine::default();
        for hours in [0, -2] {
            let request = BookingRequest::new(wednesday(), hours, 1000.0);
            let evaluation = engine.compute_cost_breakdown(&request, &catalog());
            assert_eq!(evaluation.value(), &CostBreakdown::zero());
            assert!(evaluation.has_errors());
            assert_eq!(
                evaluation.issues(),
                &[BookingIssue::InvalidDuration { hours }]
            );
        }
    }

    #[test]
    fn test_invalid_rate_returns_zero_breakdown() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 0, -50.0);
        let (breakdown, issues) = engine
            .compute_cost_breakdown(&request, &catalog())
            .into_parts();
        assert_eq!(breakdown, CostBreakdown::zero());
        assert_eq!(
            issues,
            vec![
                BookingIssue::InvalidDuration { hours: 0 },
                BookingIssue::InvalidRate { rate: -50.0 },
            ]
        );

        let request = BookingRequest::new(wednesday(), 2, f64::INFINITY);
        let evaluation = engine.compute_cost_breakdown(&request, &catalog());
        assert_eq!(evaluation.value(), &CostBreakdown::zero());
        assert!(evaluation.has_errors());
    }

    fn expensive_catalog() -> ServiceCatalog {
        ServiceCatalog::try_from_services([
            AddOnService::create("stadium".into(), "Stadium".to_owned(), f64::MAX).unwrap(),
            AddOnService::create("broadcast".into(), "Broadcast".to_owned(), f64::MAX).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_overflowing_base_cost_is_reported() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), i64::MAX, f64::MAX);
        let evaluation = engine.compute_cost_breakdown(&request, &catalog());
        assert_eq!(evaluation.value(), &CostBreakdown::zero());
        assert_eq!(
            evaluation.issues(),
            &[BookingIssue::CostOverflow {
                component: CostComponent::Base
            }]
        );

        // 割増で初めて有限でなくなる場合
        let request = BookingRequest::new(saturday(), 1, f64::MAX);
        let evaluation = engine.compute_cost_breakdown(&request, &catalog());
        assert_eq!(evaluation.value(), &CostBreakdown::zero());
        assert_eq!(
            evaluation.issues(),
            &[BookingIssue::CostOverflow {
                component: CostComponent::Base
            }]
        );
    }

    #[test]
    fn test_overflowing_services_cost_blames_services() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 1, 100.0)
            .with_service("stadium")
            .with_service("broadcast");
        let evaluation = engine.compute_cost_breakdown(&request, &expensive_catalog());
        assert_eq!(evaluation.value(), &CostBreakdown::zero());
        assert!(evaluation.has_errors());
        assert_eq!(
            evaluation.issues(),
            &[BookingIssue::CostOverflow {
                component: CostComponent::Services
            }]
        );
        assert!(!evaluation
            .issues()
            .iter()
            .any(|issue| matches!(issue, BookingIssue::InvalidRate { .. })));
    }

    #[test]
    fn test_overflowing_sum_blames_total() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 1, f64::MAX).with_service("stadium");
        let evaluation = engine.compute_cost_breakdown(&request, &expensive_catalog());
        assert_eq!(evaluation.value(), &CostBreakdown::zero());
        assert_eq!(
            evaluation.issues(),
            &[BookingIssue::CostOverflow {
                component: CostComponent::Total
            }]
        );
    }

    #[test]
    fn test_custom_policy() {
        let engine = PricingEngine::new(PricingPolicy {
            weekend_surcharge: 0.5,
            long_duration_discount: 0.25,
            discount_min_hours: 2,
        })
        .unwrap();
        let weekend = *engine
            .compute_cost_breakdown(&BookingRequest::new(sunday(), 2, 100.0), &catalog())
            .value();
        assert_eq!(weekend.base_cost, 300.0);
        let weekday = *engine
            .compute_cost_breakdown(&BookingRequest::new(wednesday(), 2, 100.0), &catalog())
            .value();
        assert_eq!(weekday.discount_amount, 50.0);
        assert_eq!(weekday.total_cost, 150.0);
    }

    #[test]
    fn test_policy_validation() {
        let invalid = PricingPolicy {
            long_duration_discount: 1.5,
            ..Default::default()
        };
        assert_eq!(
            PricingEngine::new(invalid).unwrap_err(),
            PolicyError::InvalidDiscount { rate: 1.5 }
        );
        let invalid = PricingPolicy {
            weekend_surcharge: -0.1,
            ..Default::default()
        };
        assert!(PricingEngine::new(invalid).is_err());

        let error: Box<dyn std::error::Error> = Box::new(PolicyError::InvalidDiscountThreshold {
            hours: 0,
        });
        assert!(error.source().is_none());
        assert_eq!(
            error.to_string(),
            "Discount threshold must be at least one hour, got 0"
        );
    }

    #[test]
    fn test_money_helpers() {
        let engine = PricingEngine::default();
        let request = BookingRequest::new(wednesday(), 3, 333.333);
        let breakdown = *engine.compute_cost_breakdown(&request, &catalog()).value();
        assert_eq!(breakdown.total(Currency::INR).to_string(), "₹900.00");
        assert_eq!(breakdown.discount(Currency::INR).to_string(), "₹100.00");
    }
}
