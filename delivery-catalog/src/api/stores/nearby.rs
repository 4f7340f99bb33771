//! Nearby store ranking

use std::cmp::Ordering;

use rust_decimal::Decimal;
use shared::models::{NearbySort, NearbyStore, NearbyStoreQuery, Store, haversine_km};

/// Filter candidates to the radius and optional limits, sort, then truncate
pub fn rank(stores: Vec<Store>, query: &NearbyStoreQuery) -> Vec<NearbyStore> {
    let mut hits: Vec<(f64, Store)> = stores
        .into_iter()
        .filter(|s| s.is_active)
        .filter_map(|store| {
            let (lat, lon) = store.address.coordinates()?;
            let distance = haversine_km(query.latitude, query.longitude, lat, lon);
            (distance <= query.radius_km).then_some((distance, store))
        })
        .filter(|(_, s)| passes_filters(s, query))
        .collect();

    hits.sort_by(|(da, a), (db, b)| compare(query.sort_by, (*da, a), (*db, b)));
    hits.truncate(query.limit);

    hits.into_iter()
        .map(|(distance, store)| NearbyStore {
            store,
            distance_km: round_km(distance),
        })
        .collect()
}

fn passes_filters(store: &Store, query: &NearbyStoreQuery) -> bool {
    let fee_ok = match (query.max_delivery_fee, store.delivery_fee) {
        (Some(max), Some(fee)) => fee <= max,
        _ => true,
    };
    let time_ok = match (query.max_delivery_time, store.estimated_delivery_time) {
        (Some(max), Some(time)) => time <= max,
        _ => true,
    };
    let rating_ok = query.min_rating.is_none_or(|min| store.rating >= min);
    fee_ok && time_ok && rating_ok
}

fn compare(sort: NearbySort, (da, a): (f64, &Store), (db, b): (f64, &Store)) -> Ordering {
    let by_distance = da.total_cmp(&db);
    match sort {
        NearbySort::Distance => by_distance,
        NearbySort::Rating => b.rating.cmp(&a.rating).then(by_distance),
        // Unknown delivery time or fee sorts last
        NearbySort::DeliveryTime => a
            .estimated_delivery_time
            .unwrap_or(i32::MAX)
            .cmp(&b.estimated_delivery_time.unwrap_or(i32::MAX))
            .then(by_distance),
        NearbySort::DeliveryFee => a
            .delivery_fee
            .unwrap_or(Decimal::MAX)
            .cmp(&b.delivery_fee.unwrap_or(Decimal::MAX))
            .then(by_distance),
    }
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
