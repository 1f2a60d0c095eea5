//! Client-side input validation
//!
//! Create/update payloads are checked here before any network call; the
//! server re-validates, but a bad form never leaves the device.

use crate::{ClientError, ClientResult};
use shared::{TableCreate, TableUpdate};

/// Zone names longer than this are rejected
pub const MAX_ZONE_NAME_LEN: usize = 50;

pub fn table_create(payload: &TableCreate) -> ClientResult<()> {
    numero(payload.numero)?;
    capacidad(payload.capacidad)?;
    if let Some(zona) = &payload.zona {
        zone_name(zona)?;
    }
    Ok(())
}

pub fn table_update(payload: &TableUpdate) -> ClientResult<()> {
    if let Some(value) = payload.numero {
        numero(value)?;
    }
    if let Some(value) = payload.capacidad {
        capacidad(value)?;
    }
    if let Some(zona) = &payload.zona {
        zone_name(zona)?;
    }
    Ok(())
}

fn numero(value: i32) -> ClientResult<()> {
    if value < 1 {
        return Err(ClientError::Validation(
            "numero must be a positive table number".to_string(),
        ));
    }
    Ok(())
}

fn capacidad(value: i32) -> ClientResult<()> {
    if !(1..=50).contains(&value) {
        return Err(ClientError::Validation(
            "capacidad must be between 1 and 50".to_string(),
        ));
    }
    Ok(())
}

fn zone_name(value: &str) -> ClientResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "zona must not be blank".to_string(),
        ));
    }
    if trimmed.len() > MAX_ZONE_NAME_LEN {
        return Err(ClientError::Validation(format!(
            "zona must be at most {MAX_ZONE_NAME_LEN} characters"
        )));
    }
    Ok(())
}
