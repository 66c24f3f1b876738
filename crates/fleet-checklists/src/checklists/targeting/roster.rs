//! Fleet roster exports (CSV) read into a [`FleetSnapshot`].

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::super::domain::{UserId, VehicleId, VehicleTypeRef};
use super::{FleetSnapshot, FleetUser, Vehicle};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("unable to open roster {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{roster} roster row {row} has an empty {field}")]
    BlankField {
        roster: &'static str,
        row: usize,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct VehicleRow {
    id: String,
    #[serde(alias = "vehicle_type_ref", alias = "type")]
    vehicle_type: String,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: String,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads `id,vehicle_type` rows. Row numbers in errors are 1-based and exclude the header.
pub fn read_vehicles<R: Read>(reader: R) -> Result<Vec<Vehicle>, RosterError> {
    let mut vehicles = Vec::new();

    for (index, row) in csv_reader(reader).deserialize::<VehicleRow>().enumerate() {
        let row = row?;
        let row_number = index + 1;
        if row.id.is_empty() {
            return Err(blank("vehicle", row_number, "id"));
        }
        if row.vehicle_type.is_empty() {
            return Err(blank("vehicle", row_number, "vehicle_type"));
        }

        vehicles.push(Vehicle {
            id: VehicleId(row.id),
            vehicle_type_ref: VehicleTypeRef(row.vehicle_type),
        });
    }

    Ok(vehicles)
}

pub fn read_users<R: Read>(reader: R) -> Result<Vec<FleetUser>, RosterError> {
    let mut users = Vec::new();

    for (index, row) in csv_reader(reader).deserialize::<UserRow>().enumerate() {
        let row = row?;
        if row.id.is_empty() {
            return Err(blank("user", index + 1, "id"));
        }
        users.push(FleetUser { id: UserId(row.id) });
    }

    Ok(users)
}

pub fn load_snapshot(
    vehicles_path: impl AsRef<Path>,
    users_path: impl AsRef<Path>,
) -> Result<FleetSnapshot, RosterError> {
    let vehicles = read_vehicles(open(vehicles_path.as_ref())?)?;
    let users = read_users(open(users_path.as_ref())?)?;

    Ok(FleetSnapshot {
        vehicles,
        users,
        vehicle_types: Vec::new(),
    })
}

fn open(path: &Path) -> Result<File, RosterError> {
    File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn blank(roster: &'static str, row: usize, field: &'static str) -> RosterError {
    RosterError::BlankField { roster, row, field }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_vehicles_with_trimmed_fields() {
        let csv = "id,vehicle_type\n v1 , Cavalo Mecânico \nv2,VUC\n";

        let vehicles = read_vehicles(Cursor::new(csv)).expect("roster parses");

        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].id, VehicleId::new("v1"));
        assert_eq!(
            vehicles[0].vehicle_type_ref,
            VehicleTypeRef::new("Cavalo Mecânico")
        );
    }

    #[test]
    fn accepts_vehicle_type_ref_header() {
        let csv = "id,vehicle_type_ref\nv9,Truck\n";

        let vehicles = read_vehicles(Cursor::new(csv)).expect("roster parses");

        assert_eq!(vehicles[0].vehicle_type_ref, VehicleTypeRef::new("Truck"));
    }

    #[test]
    fn rejects_blank_user_ids() {
        let csv = "id\nu1\n\"  \"\n";

        match read_users(Cursor::new(csv)) {
            Err(RosterError::BlankField { roster, row, field }) => {
                assert_eq!((roster, row, field), ("user", 2, "id"));
            }
            other => panic!("expected blank field error, got {other:?}"),
        }
    }

    #[test]
    fn missing_columns_surface_as_csv_errors() {
        let csv = "identifier\nv1\n";

        assert!(matches!(
            read_vehicles(Cursor::new(csv)),
            Err(RosterError::Csv(_))
        ));
    }

    #[test]
    fn missing_files_report_the_path() {
        match load_snapshot("/nonexistent/vehicles.csv", "/nonexistent/users.csv") {
            Err(RosterError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/vehicles.csv"));
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
