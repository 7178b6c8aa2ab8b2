use std::{
    collections::BTreeSet,
    env,
    error::Error,
    fmt::{self, Write},
    path::PathBuf,
};

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use tracing::{error, info, warn, Level};
use turfbook::{
    domain::{
        booking::{
            evaluate_slots, now_if_today, BookingRequest, CostBreakdown, Currency,
            PricingEngine, ReservationSource, ResourceId, ServiceKey, SlotAvailability,
            SlotQuery, TimeOfDay,
        },
        Evaluation,
    },
    infrastructure::JsonReservationSource,
    TurfConfig,
};

#[tokio::main]
async fn main() {
    match TurfConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = preview(&config).await {
                error!("アプリケーションエラー: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("設定読み込みエラー: {}", error)
        }
    }
}

/// 画面から受け取る予約の入力
#[serde_as]
#[derive(Debug, Deserialize)]
struct PreviewRequest {
    resource_id: ResourceId,
    date: NaiveDate,
    duration_hours: i64,
    hourly_base_rate: f64,
    #[serde(default)]
    services: BTreeSet<ServiceKey>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    candidate_starts: Vec<TimeOfDay>,
}

async fn preview(config: &TurfConfig) -> Result<(), Box<dyn Error>> {
    let path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: turfbook_preview <request.json>")?;
    let request: PreviewRequest = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
    info!("予約内容を読み込み: {:?}", path);

    let engine = PricingEngine::new(config.pricing)?;
    let catalog = config.service_catalog()?;
    let booking = BookingRequest {
        date: request.date,
        duration_hours: request.duration_hours,
        hourly_base_rate: request.hourly_base_rate,
        selected_services: request.services,
    };
    let cost = engine.compute_cost_breakdown(&booking, &catalog);

    let source = JsonReservationSource::open(&config.reservations.path);
    let conflicts = source
        .find_by_date(request.resource_id, request.date)
        .await?;
    info!("予約済み時間帯を取得: {}件", conflicts.len());

    let query = SlotQuery {
        date: request.date,
        now_if_today: now_if_today(request.date, Local::now().naive_local()),
        duration_hours: request.duration_hours,
        candidate_starts: request.candidate_starts,
    };
    let slots = evaluate_slots(&query, &conflicts);

    for issue in cost.issues().iter().chain(slots.issues()) {
        warn!("入力の診断 ({:?}): {}", issue.severity(), issue);
    }
    print!("{}", render(&cost, &slots, config.catalog.currency)?);
    Ok(())
}

fn render(
    cost: &Evaluation<CostBreakdown>,
    slots: &Evaluation<Vec<SlotAvailability>>,
    currency: Currency,
) -> Result<String, fmt::Error> {
    let breakdown = cost.value();
    let mut out = String::new();
    writeln!(out, "Base:     {}", breakdown.base(currency))?;
    writeln!(out, "Services: {}", breakdown.services(currency))?;
    if breakdown.is_weekend {
        writeln!(out, "Weekend surcharge applied")?;
    }
    if breakdown.discount_applies {
        writeln!(out, "Discount: -{}", breakdown.discount(currency))?;
    }
    writeln!(out, "Total:    {}", breakdown.total(currency))?;
    for slot in slots.value() {
        writeln!(out, "{}  {:?}", slot.start, slot.status)?;
    }
    Ok(out)
}
