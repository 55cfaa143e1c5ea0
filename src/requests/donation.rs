use crate::models::donation::PaymentMethod;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub amount: Decimal,
    pub campaign_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub donor_name: String,
    pub donor_email: String,
}
