//! Validation utilities and advisory alerts for soil measurements
//!
//! Alert ranges follow the agronomic guidance used for the Los Lagos /
//! Los Ríos region.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::SoilSample;

/// Severity of an advisory alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Critical,
    Warning,
    Optimal,
    Info,
}

/// One advisory alert attached to a recommendation detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilAlert {
    pub level: AlertLevel,
    pub parameter: String,
    pub message_en: String,
    pub message_es: String,
}

impl SoilAlert {
    fn new(level: AlertLevel, parameter: &str, message_en: String, message_es: String) -> Self {
        Self {
            level,
            parameter: parameter.to_string(),
            message_en,
            message_es,
        }
    }
}

fn dec(value: i64, scale: u32) -> Decimal {
    Decimal::new(value, scale)
}

/// Validate that a pH value is physically meaningful
pub fn validate_ph(ph: Decimal) -> Result<(), &'static str> {
    if ph < Decimal::ZERO || ph > Decimal::from(14) {
        return Err("pH must be between 0 and 14");
    }
    Ok(())
}

/// Validate a percentage field such as soil humidity
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Classify each present field of a sample against its agronomic range.
///
/// Absent fields produce no alert; the list always ends with a general note
/// reminding the reader the ranges are zone- and soil-specific.
pub fn soil_alerts(sample: &SoilSample) -> Vec<SoilAlert> {
    let mut alerts = Vec::new();

    if let Some(ph) = sample.ph {
        if ph < dec(50, 1) || ph > dec(75, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "pH",
                format!("pH ({ph}) outside the 5.0-7.5 range"),
                format!("pH ({ph}) fuera de rango (5.0-7.5)"),
            ));
        } else if ph < dec(55, 1) || ph > dec(70, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Warning,
                "pH",
                format!("pH ({ph}) at a warning level (5.0-5.5 or 7.0-7.5)"),
                format!("pH ({ph}) en nivel de advertencia (5.0-5.5 o 7.0-7.5)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "pH",
                format!("pH ({ph}) within the 5.5-7.0 range"),
                format!("pH ({ph}) dentro del rango (5.5-7.0)"),
            ));
        }
    }

    if let Some(temperature) = sample.temperature {
        if temperature < dec(50, 1) || temperature > dec(350, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "temperature",
                format!("Temperature ({temperature}°C) outside the 5-35°C range"),
                format!("Temperatura ({temperature}°C) fuera de rango (5-35°C)"),
            ));
        } else if temperature >= dec(150, 1) && temperature <= dec(250, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "temperature",
                format!("Temperature ({temperature}°C) within the 15-25°C range"),
                format!("Temperatura ({temperature}°C) dentro del rango (15-25°C)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Info,
                "temperature",
                format!("Temperature ({temperature}°C) outside the optimal 15-25°C range"),
                format!("Temperatura ({temperature}°C) fuera del rango óptimo (15-25°C)"),
            ));
        }
    }

    if let Some(humidity) = sample.humidity {
        if humidity < dec(200, 1) || humidity > dec(900, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "humidity",
                format!("Humidity ({humidity}%) outside the 20-90% range"),
                format!("Humedad ({humidity}%) fuera de rango (20-90%)"),
            ));
        } else if humidity >= dec(400, 1) && humidity <= dec(700, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "humidity",
                format!("Humidity ({humidity}%) within the 40-70% range"),
                format!("Humedad ({humidity}%) dentro del rango (40-70%)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Info,
                "humidity",
                format!("Humidity ({humidity}%) outside the optimal 40-70% range"),
                format!("Humedad ({humidity}%) fuera del rango óptimo (40-70%)"),
            ));
        }
    }

    if let Some(nitrogen) = sample.nitrogen {
        if nitrogen < Decimal::from(10) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "nitrogen",
                format!("Nitrogen ({nitrogen} ppm) critically low (<10 ppm)"),
                format!("Nitrógeno ({nitrogen} ppm) críticamente bajo (<10 ppm)"),
            ));
        } else if nitrogen >= Decimal::from(15) && nitrogen <= Decimal::from(40) {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "nitrogen",
                format!("Nitrogen ({nitrogen} ppm) within the 15-40 ppm range"),
                format!("Nitrógeno ({nitrogen} ppm) dentro del rango (15-40 ppm)"),
            ));
        } else if nitrogen > Decimal::from(50) {
            alerts.push(SoilAlert::new(
                AlertLevel::Warning,
                "nitrogen",
                format!("Nitrogen ({nitrogen} ppm) high (>50 ppm)"),
                format!("Nitrógeno ({nitrogen} ppm) alto (>50 ppm)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Info,
                "nitrogen",
                format!("Nitrogen ({nitrogen} ppm) outside the optimal 15-40 ppm range"),
                format!("Nitrógeno ({nitrogen} ppm) fuera del rango óptimo (15-40 ppm)"),
            ));
        }
    }

    if let Some(phosphorus) = sample.phosphorus {
        if phosphorus < Decimal::from(8) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "phosphorus",
                format!("Phosphorus ({phosphorus} ppm) critically low (<8 ppm)"),
                format!("Fósforo ({phosphorus} ppm) críticamente bajo (<8 ppm)"),
            ));
        } else if phosphorus >= Decimal::from(12) && phosphorus <= Decimal::from(30) {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "phosphorus",
                format!("Phosphorus ({phosphorus} ppm) within the 12-30 ppm range"),
                format!("Fósforo ({phosphorus} ppm) dentro del rango (12-30 ppm)"),
            ));
        } else if phosphorus > Decimal::from(30) {
            alerts.push(SoilAlert::new(
                AlertLevel::Warning,
                "phosphorus",
                format!("Phosphorus ({phosphorus} ppm) high (>30 ppm)"),
                format!("Fósforo ({phosphorus} ppm) alto (>30 ppm)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Info,
                "phosphorus",
                format!("Phosphorus ({phosphorus} ppm) outside the optimal 12-30 ppm range"),
                format!("Fósforo ({phosphorus} ppm) fuera del rango óptimo (12-30 ppm)"),
            ));
        }
    }

    if let Some(potassium) = sample.potassium {
        if potassium < dec(2, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Critical,
                "potassium",
                format!("Potassium ({potassium} cmol/kg) critically low (<0.2 cmol/kg)"),
                format!("Potasio ({potassium} cmol/kg) críticamente bajo (<0.2 cmol/kg)"),
            ));
        } else if potassium >= dec(3, 1) && potassium <= dec(8, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Optimal,
                "potassium",
                format!("Potassium ({potassium} cmol/kg) within the 0.3-0.8 cmol/kg range"),
                format!("Potasio ({potassium} cmol/kg) dentro del rango (0.3-0.8 cmol/kg)"),
            ));
        } else if potassium > dec(8, 1) {
            alerts.push(SoilAlert::new(
                AlertLevel::Warning,
                "potassium",
                format!("Potassium ({potassium} cmol/kg) high (>0.8 cmol/kg)"),
                format!("Potasio ({potassium} cmol/kg) alto (>0.8 cmol/kg)"),
            ));
        } else {
            alerts.push(SoilAlert::new(
                AlertLevel::Info,
                "potassium",
                format!("Potassium ({potassium} cmol/kg) outside the optimal 0.3-0.8 cmol/kg range"),
                format!("Potasio ({potassium} cmol/kg) fuera del rango óptimo (0.3-0.8 cmol/kg)"),
            ));
        }
    }

    alerts.push(SoilAlert::new(
        AlertLevel::Info,
        "general",
        "Dosages were calculated for the parcel's configured soil type and zone".to_string(),
        "Los cálculos se hicieron para un tipo de suelo y zona específicos".to_string(),
    ));

    alerts
}
