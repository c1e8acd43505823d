use serde::{Deserialize, Serialize};

use crate::params::QueryParameterMap;

const STORE_ID_KEY: &str = "storeid";
const COUNTRY_ID_KEY: &str = "countryid";
const TYPE_KEY: &str = "type";
const COUPON_KEY: &str = "autoapplycoupon";
const EXTRA_DETAILS_KEY: &str = "extradetails";

/// The five fields a resolved scan hands to the app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFields {
    pub store_id: String,
    pub country_id: String,
    /// Target screen type (`type` in the deeplink).
    #[serde(rename = "type")]
    pub kind: String,
    pub coupon_flag: String,
    pub extra_details: String,
}

/// Read the scan fields out of a parameter map. Missing keys become empty
/// strings.
#[must_use]
pub fn dispatch(params: &QueryParameterMap) -> ScanFields {
    let field = |key: &str| params.get(key).cloned().unwrap_or_default();
    ScanFields {
        store_id: field(STORE_ID_KEY),
        country_id: field(COUNTRY_ID_KEY),
        kind: field(TYPE_KEY),
        coupon_flag: field(COUPON_KEY),
        extra_details: field(EXTRA_DETAILS_KEY),
    }
}
