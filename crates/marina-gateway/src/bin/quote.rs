//! # marina-quote
//!
//! Offline smoke tool: auto-assigns seats for a sample party on a built-in
//! ship layout and prints the seat map and the itemized fare.
//!
//! ```text
//! marina-quote [SHIP_TYPE] [CLASS] [CURRENCY] [DAYS_AHEAD]
//! marina-quote catamaran business EUR 45
//! ```
//!
//! Pricing, extra layouts and fallback rates come from `marina.toml`.
//! No network calls are made; conversion uses the fallback rate table.

use chrono::{Duration, Utc};
use marina_core::fare::LegFare;
use marina_core::inventory::SeatStatus;
use marina_core::{
    BookingSession, ClassCounts, CoreError, Currency, DisplayAmount, ExchangeRateTable, Leg, Money,
    PassengerTypeCounts, SeatMapView, SeatOccupancy, ShipType, TicketClass, Voyage, VoyageId,
};
use marina_gateway::{GatewayConfig, GatewayResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    if let Err(e) = run() {
        error!(?e, "Quote failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marina_gateway=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> GatewayResult<()> {
    let mut args = std::env::args().skip(1);
    let ship_type = ShipType::new(args.next().unwrap_or_else(|| "catamaran".to_string()));
    let ticket_class: TicketClass = args
        .next()
        .as_deref()
        .unwrap_or("economy")
        .parse()
        .map_err(CoreError::from)?;
    let currency: Currency = args.next().as_deref().unwrap_or("TRY").parse()?;
    let days_ahead: i64 = args.next().and_then(|d| d.parse().ok()).unwrap_or(20);

    let config = GatewayConfig::load_or_default(None);
    let layouts = config.layout_catalog()?;
    let capacity = layouts.get(&ship_type)?.capacity();
    info!(ship_type = %ship_type, class = %ticket_class, "Quoting sample booking");

    let sold = ClassCounts {
        promo: capacity.promo / 4,
        economy: capacity.economy / 3,
        business: capacity.business / 6,
    };
    let today = Utc::now();
    let departure = today + Duration::days(days_ahead);
    let voyage = Voyage {
        id: VoyageId::new("SAMPLE-1"),
        departure_time: departure,
        arrival_time: departure + Duration::minutes(95),
        ship_type,
        remaining: ClassCounts {
            promo: capacity.promo - sold.promo,
            economy: capacity.economy - sold.economy,
            business: capacity.business - sold.business,
        },
        occupancy: SeatOccupancy::Counts(sold),
    };

    let mut session = BookingSession::new(today.date_naive());
    let leg = session.leg_mut(Leg::Departure)?;
    leg.set_voyage(voyage, &layouts)?;
    leg.set_ticket_class(ticket_class)?;
    leg.set_passenger_counts(PassengerTypeCounts {
        adult: 1,
        student: 1,
        senior: 0,
        child: 1,
    })?;

    if leg.layout().is_some() {
        let shortfall = leg.select_auto_seats()?;
        if shortfall > 0 {
            println!("warning: {} passenger(s) without a seat", shortfall);
        }
        print_seat_map(&leg.seat_map()?);
    } else {
        println!("Open seating: seats are assigned at boarding.\n");
    }

    let fare = session.fare(&config.pricing.catalog(), &config.pricing.policy())?;
    let rates = config.fallback_rates();
    print_leg_fare(&fare.departure, currency, &rates)?;
    println!("Grand total: {}", shown(fare.grand_total, currency, &rates)?);
    Ok(())
}

fn shown(amount: Money, currency: Currency, rates: &ExchangeRateTable) -> GatewayResult<DisplayAmount> {
    Ok(DisplayAmount::new(rates.from_base(amount, currency)?, currency))
}

// =============================================================================
// Output
// =============================================================================

fn print_seat_map(view: &SeatMapView) {
    println!("{} / {}", view.ship_type, view.ticket_class);
    println!("  . free   x sold   # other class   1-9 passenger\n");

    for deck in &view.decks {
        println!("{}", deck.deck);
        for (i, row) in deck.rows.iter().enumerate() {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    None => ' ',
                    Some(seat) => match seat.status {
                        SeatStatus::Available => '.',
                        SeatStatus::Occupied => 'x',
                        SeatStatus::Restricted => '#',
                        SeatStatus::Selected => seat
                            .passenger
                            .and_then(|p| char::from_digit((p + 1) as u32, 10))
                            .unwrap_or('*'),
                    },
                })
                .collect();
            println!("  {:>2} {}", i + 1, line);
        }
        println!();
    }
    println!("Selected: {}\n", view.selected.join(", "));
}

fn print_leg_fare(fare: &LegFare, currency: Currency, rates: &ExchangeRateTable) -> GatewayResult<()> {
    for line in &fare.lines {
        println!(
            "  {:<8} {} x {} (-{}) = {}",
            line.passenger_type.to_string(),
            line.count,
            shown(line.discounted_unit_price, currency, rates)?,
            line.discount,
            shown(line.total, currency, rates)?
        );
    }
    if fare.early_booking {
        println!(
            "  early booking      -{}",
            shown(fare.early_booking_discount, currency, rates)?
        );
    }
    println!(
        "  service fee x {}   {}",
        fare.passenger_count,
        shown(fare.service_fee_total, currency, rates)?
    );
    println!("  leg total          {}", shown(fare.total, currency, rates)?);
    Ok(())
}
