use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;

use storepulse_core::organizations::{Organization, OrganizationCost};

use crate::errors::StorageError;
use crate::utils::{parse_date, parse_optional_timestamp, parse_timestamp};

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrganizationDB {
    pub id: String,
    pub name: String,
    pub onboarding_completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrganizationDB> for Organization {
    fn from(db: OrganizationDB) -> Self {
        Organization {
            id: db.id,
            name: db.name,
            onboarding_completed_at: parse_optional_timestamp(db.onboarding_completed_at),
            created_at: parse_timestamp(&db.created_at),
            updated_at: parse_timestamp(&db.updated_at),
        }
    }
}

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::organization_costs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrganizationCostDB {
    pub id: String,
    pub organization_id: String,
    pub label: String,
    pub amount: String,
    pub currency: String,
    pub effective_from: String,
    pub created_at: String,
}

impl TryFrom<OrganizationCostDB> for OrganizationCost {
    type Error = StorageError;

    fn try_from(db: OrganizationCostDB) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&db.amount)
            .map_err(|e| StorageError::Corrupt(format!("cost {} amount: {}", db.id, e)))?;
        let effective_from = parse_date(&db.effective_from).ok_or_else(|| {
            StorageError::Corrupt(format!(
                "cost {} effective date '{}'",
                db.id, db.effective_from
            ))
        })?;
        Ok(OrganizationCost {
            id: db.id,
            organization_id: db.organization_id,
            label: db.label,
            amount,
            currency: db.currency,
            effective_from,
            created_at: parse_timestamp(&db.created_at),
        })
    }
}
