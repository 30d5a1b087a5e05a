//! Ad accounts, campaigns, ad sets and ads.
//!
//! New campaigns, ad sets and ads are always created `PAUSED`.

use crate::GraphHttp;
use fbgate_types::{FbError, traits::Result};
use serde::Deserialize;
use serde_json::{Value, json};

/// Campaign objectives accepted by [`GraphHttp::create_campaign`].
pub const VALID_OBJECTIVES: &[&str] = &[
    "APP_INSTALLS",
    "BRAND_AWARENESS",
    "EVENT_RESPONSES",
    "LEAD_GENERATION",
    "LINK_CLICKS",
    "LOCAL_AWARENESS",
    "MESSAGES",
    "OFFER_CLAIMS",
    "PAGE_LIKES",
    "POST_ENGAGEMENT",
    "PRODUCT_CATALOG_SALES",
    "REACH",
    "STORE_VISITS",
    "VIDEO_VIEWS",
    "OUTCOME_AWARENESS",
    "OUTCOME_ENGAGEMENT",
    "OUTCOME_LEADS",
    "OUTCOME_SALES",
    "OUTCOME_TRAFFIC",
    "OUTCOME_APP_PROMOTION",
    "CONVERSIONS",
];

pub const DEFAULT_OBJECTIVE: &str = "OUTCOME_ENGAGEMENT";

pub const AD_ACCOUNT_FIELDS: &str = "name,account_id,account_status,disable_reason,\
timezone_id,timezone_name,timezone_offset_hours_utc,currency,id";

pub const AD_ACCOUNT_LIMIT: &str = "600";

pub const CAMPAIGN_FIELDS: &str = "id,name,objective,status,effective_status,created_time";

const PAUSED: &str = "PAUSED";

fn default_objective() -> String {
    DEFAULT_OBJECTIVE.to_string()
}

/// Parameters of a new campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInput {
    pub account_id: String,
    pub name: String,
    #[serde(default = "default_objective")]
    pub objective: String,
    #[serde(default)]
    pub access_token: String,
}

/// Parameters of a new ad set. `targeting` defaults to [`default_targeting`].
#[derive(Debug, Clone, Deserialize)]
pub struct AdSetInput {
    pub account_id: String,
    pub campaign_id: String,
    pub name: String,
    pub daily_budget: u64,
    pub start_time: String,
    pub end_time: String,
    pub access_token: String,
    #[serde(default)]
    pub targeting: Option<Value>,
}

/// Parameters of a new image link ad.
#[derive(Debug, Clone, Deserialize)]
pub struct AdInput {
    pub account_id: String,
    pub adset_id: String,
    pub page_id: String,
    pub ad_name: String,
    pub image_hash: String,
    pub message: String,
    pub link: String,
    pub access_token: String,
}

/// Parameters of a new video ad. `thumbnail_hash` is an `adimages` hash.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoAdInput {
    pub account_id: String,
    pub adset_id: String,
    pub page_id: String,
    pub ad_name: String,
    pub video_id: String,
    pub thumbnail_hash: String,
    pub message: String,
    pub link: String,
    pub access_token: String,
}

/// Graph path prefix of an ad account; accepts ids with or without `act_`.
#[must_use]
pub fn act_path(account_id: &str) -> String {
    if account_id.starts_with("act_") {
        account_id.to_string()
    } else {
        format!("act_{account_id}")
    }
}

/// Rejects objectives outside [`VALID_OBJECTIVES`].
///
/// # Errors
///
/// Returns [`FbError::Validation`] naming the accepted values.
pub fn validate_objective(objective: &str) -> Result<()> {
    if VALID_OBJECTIVES.contains(&objective) {
        Ok(())
    } else {
        Err(FbError::Validation(format!(
            "Invalid objective '{objective}'. Must be one of: {}",
            VALID_OBJECTIVES.join(", ")
        )))
    }
}

/// Broad audience used when an ad set names no targeting.
#[must_use]
pub fn default_targeting() -> Value {
    json!({
        "geo_locations": {"countries": ["US"]},
        "age_min": 18,
        "age_max": 65,
        "genders": [1, 2],
    })
}

#[must_use]
pub fn campaign_payload(name: &str, objective: &str) -> Value {
    json!({
        "name": name,
        "objective": objective,
        "status": PAUSED,
        "special_ad_categories": ["NONE"],
    })
}

#[must_use]
pub fn adset_payload(input: &AdSetInput) -> Value {
    json!({
        "name": input.name,
        "campaign_id": input.campaign_id,
        "daily_budget": input.daily_budget,
        "start_time": input.start_time,
        "end_time": input.end_time,
        "billing_event": "IMPRESSIONS",
        "optimization_goal": "REACH",
        "targeting": input.targeting.clone().unwrap_or_else(default_targeting),
        "status": PAUSED,
    })
}

#[must_use]
pub fn ad_payload(input: &AdInput) -> Value {
    json!({
        "name": input.ad_name,
        "adset_id": input.adset_id,
        "creative": {
            "object_story_spec": {
                "page_id": input.page_id,
                "link_data": {
                    "image_hash": input.image_hash,
                    "message": input.message,
                    "link": input.link,
                    "call_to_action": {
                        "type": "LEARN_MORE",
                        "value": {"link": input.link},
                    },
                },
            },
        },
        "status": PAUSED,
    })
}

/// The video creative is titled with the ad name.
#[must_use]
pub fn video_ad_payload(input: &VideoAdInput) -> Value {
    json!({
        "name": input.ad_name,
        "adset_id": input.adset_id,
        "creative": {
            "object_story_spec": {
                "page_id": input.page_id,
                "video_data": {
                    "video_id": input.video_id,
                    "title": input.ad_name,
                    "message": input.message,
                    "image_hash": input.thumbnail_hash,
                    "call_to_action": {
                        "type": "LEARN_MORE",
                        "value": {"link": input.link},
                    },
                },
            },
        },
        "status": PAUSED,
    })
}

impl GraphHttp {
    /// The user's ad accounts with the standard field set.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn list_ad_accounts(&self, access_token: &str) -> Result<Value> {
        self.get(
            "me/adaccounts",
            &[
                ("access_token", access_token),
                ("limit", AD_ACCOUNT_LIMIT),
                ("fields", AD_ACCOUNT_FIELDS),
            ],
        )
        .await
    }

    /// `me/adaccounts` with Graph's default fields and paging.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn raw_ad_accounts(&self, access_token: &str) -> Result<Value> {
        self.get("me/adaccounts", &[("access_token", access_token)])
            .await
    }

    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn get_campaign(&self, campaign_id: &str, access_token: &str) -> Result<Value> {
        if campaign_id.is_empty() {
            return Err(FbError::Validation("campaign_id must not be empty".into()));
        }
        self.get(
            campaign_id,
            &[("fields", CAMPAIGN_FIELDS), ("access_token", access_token)],
        )
        .await
    }

    /// Creates a paused campaign.
    ///
    /// # Errors
    ///
    /// [`FbError::Validation`] for an unknown objective (no request is
    /// sent); otherwise transport, JSON, or inline Graph errors.
    pub async fn create_campaign(&self, input: &CampaignInput) -> Result<Value> {
        validate_objective(&input.objective)?;
        let path = format!("{}/campaigns", act_path(&input.account_id));
        let created = self
            .post_json(
                &path,
                &input.access_token,
                &campaign_payload(&input.name, &input.objective),
            )
            .await?;
        tracing::info!(account = %input.account_id, "campaign created");
        Ok(created)
    }

    /// Creates a paused ad set.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn create_adset(&self, input: &AdSetInput) -> Result<Value> {
        let path = format!("{}/adsets", act_path(&input.account_id));
        let created = self
            .post_json(&path, &input.access_token, &adset_payload(input))
            .await?;
        tracing::info!(account = %input.account_id, campaign = %input.campaign_id, "ad set created");
        Ok(created)
    }

    /// Creates a paused image link ad.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn create_ad(&self, input: &AdInput) -> Result<Value> {
        let path = format!("{}/ads", act_path(&input.account_id));
        let created = self
            .post_json(&path, &input.access_token, &ad_payload(input))
            .await?;
        tracing::info!(account = %input.account_id, adset = %input.adset_id, "ad created");
        Ok(created)
    }

    /// Creates a paused video ad.
    ///
    /// # Errors
    ///
    /// Transport, JSON, or inline Graph errors.
    pub async fn create_video_ad(&self, input: &VideoAdInput) -> Result<Value> {
        let path = format!("{}/ads", act_path(&input.account_id));
        let created = self
            .post_json(&path, &input.access_token, &video_ad_payload(input))
            .await?;
        tracing::info!(
            account = %input.account_id,
            adset = %input.adset_id,
            video = %input.video_id,
            "video ad created"
        );
        Ok(created)
    }
}
