//! Core domain types: session, rides, wallet ledger, car config, referral
use chrono::{DateTime, TimeZone, Timelike, Utc};

/// Authenticated user profile. Fabricated by the mock auth gateway, never
/// verified against anything.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded with hrp "user"
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub email: String,
    #[n(3)]
    pub phone: String,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideStatus {
    #[n(0)]
    Active,
    #[n(1)]
    Completed,
    #[n(2)]
    Cancelled,
}

/// A booked ride. `id` is a raw uuid7 string, so ids sort in generation
/// order. No operation moves a ride to `Completed` here; completed rides
/// only exist as seed data.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub from: String,
    #[n(2)]
    pub to: String,
    #[n(3)]
    pub status: RideStatus,
    #[n(4)]
    pub date: String, // calendar day, YYYY-MM-DD
    #[n(5)]
    pub price_cents: u64, // use integers for currency
    #[n(6)]
    pub driver: String,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    #[n(0)]
    Credit,
    #[n(1)]
    Debit,
}

/// Append-only wallet ledger entry. Never mutated or deleted once recorded.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    #[n(0)]
    pub id: String, // uuid7 string
    #[n(1)]
    pub kind: TransactionKind,
    #[n(2)]
    pub amount_cents: u64, // always positive; kind carries the sign
    #[n(3)]
    pub description: String,
    #[n(4)]
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Sky,
    Rooftop,
    Street,
}

/// Session-only display configuration for the car canvas. Reset to defaults
/// on every fresh load.
#[derive(Debug, Clone, PartialEq)]
pub struct CarConfig {
    pub color: String, // hex string, e.g. "#00F0FF"
    pub rotation_degrees: f32,
    pub view_mode: ViewMode,
    pub night_mode: bool,
}

/// Partial update for [`CarConfig`]; only the `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarConfigPatch {
    pub color: Option<String>,
    pub rotation_degrees: Option<f32>,
    pub view_mode: Option<ViewMode>,
    pub night_mode: Option<bool>,
}

impl CarConfig {
    /// Default config; night mode follows the local clock (6pm to 6am).
    pub fn for_local_clock() -> Self {
        let hour = chrono::Local::now().hour();
        Self {
            color: "#00F0FF".into(),
            rotation_degrees: 0.0,
            view_mode: ViewMode::Street,
            night_mode: hour >= 18 || hour < 6,
        }
    }

    /// Shallow merge: fields absent from the patch keep their value.
    pub fn apply(&mut self, patch: CarConfigPatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(rotation) = patch.rotation_degrees {
            self.rotation_degrees = rotation;
        }
        if let Some(view_mode) = patch.view_mode {
            self.view_mode = view_mode;
        }
        if let Some(night_mode) = patch.night_mode {
            self.night_mode = night_mode;
        }
    }
}

/// Referral data. The code is generated once and then stable because it
/// lives in the persisted subset; the count is read-only from the UI side.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Referral {
    #[n(0)]
    pub code: String, // bech32 encoded with hrp "neon"
    #[n(1)]
    pub count: u32,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn ride_encoding() {
        let original = Ride {
            id: uuid7::uuid7().to_string(),
            from: "Downtown Hub".into(),
            to: "Airport Terminal 3".into(),
            status: RideStatus::Active,
            date: "2026-02-25".into(),
            price_cents: 4_550,
            driver: "AutoPilot".into(),
        };

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: Ride = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn car_config_patch_merges_only_given_fields() {
        let mut config = CarConfig {
            color: "#00F0FF".into(),
            rotation_degrees: 45.0,
            view_mode: ViewMode::Street,
            night_mode: false,
        };

        config.apply(CarConfigPatch {
            view_mode: Some(ViewMode::Rooftop),
            ..Default::default()
        });

        assert_eq!(config.view_mode, ViewMode::Rooftop);
        assert_eq!(config.color, "#00F0FF");
        assert_eq!(config.rotation_degrees, 45.0);
        assert!(!config.night_mode);
    }
}
