//! Site content data contracts
//!
//! The site has exactly one mutable configuration record: a set of named
//! media slots, each holding a URL. The record exists in three shapes:
//!
//! - [`SiteConfiguration`]: fully populated, every slot non-empty
//! - [`PartialSiteConfiguration`]: the locally cached copy, fields optional
//! - [`SiteSettingsRow`]: the remote singleton row, nullable snake_case columns
//!
//! All three implement [`MediaSource`] so resolution can walk an ordered list
//! of layers slot by slot.

use serde::{Deserialize, Serialize};

/// Fixed identifier of the singleton `site_settings` row
pub const SITE_SETTINGS_ID: i64 = 1;

pub const DEFAULT_LOGO_URL: &str = "https://picsum.photos/seed/ggbs-logo/256/256";
pub const DEFAULT_HERO_VIDEO_URL: &str =
    "https://videos.pexels.com/video-files/4321746/4321746-uhd_2560_1440_30fps.mp4";
pub const DEFAULT_FIGHT_VIDEO_URL: &str =
    "https://videos.pexels.com/video-files/5842186/5842186-hd_1920_1080_30fps.mp4";
pub const DEFAULT_GLOVES_IMAGE_URL: &str = "https://picsum.photos/seed/gloves/800/600";
pub const DEFAULT_EVOLUTION_IMAGE_URL: &str = "https://picsum.photos/seed/nature/800/600";
pub const DEFAULT_REVENUE_IMAGE_URL: &str = "https://picsum.photos/seed/money/800/600";

/// Named media slot on the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSlot {
    Logo,
    HeroVideo,
    FightVideo,
    GlovesImage,
    EvolutionImage,
    RevenueImage,
}

impl MediaSlot {
    /// Every slot, in display order
    pub const ALL: [MediaSlot; 6] = [
        MediaSlot::Logo,
        MediaSlot::HeroVideo,
        MediaSlot::FightVideo,
        MediaSlot::GlovesImage,
        MediaSlot::EvolutionImage,
        MediaSlot::RevenueImage,
    ];

    /// Field name used in API payloads and the local cache (camelCase)
    pub fn field_name(self) -> &'static str {
        match self {
            MediaSlot::Logo => "logoUrl",
            MediaSlot::HeroVideo => "heroVideoUrl",
            MediaSlot::FightVideo => "fightVideoUrl",
            MediaSlot::GlovesImage => "glovesImageUrl",
            MediaSlot::EvolutionImage => "evolutionImageUrl",
            MediaSlot::RevenueImage => "revenueImageUrl",
        }
    }

    /// Column name in the remote `site_settings` table
    pub fn column_name(self) -> &'static str {
        match self {
            MediaSlot::Logo => "logo_url",
            MediaSlot::HeroVideo => "hero_video_url",
            MediaSlot::FightVideo => "fight_video_url",
            MediaSlot::GlovesImage => "gloves_image_url",
            MediaSlot::EvolutionImage => "evolution_image_url",
            MediaSlot::RevenueImage => "revenue_image_url",
        }
    }
}

impl std::fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A value counts only if something other than whitespace is left
pub fn is_usable(value: &str) -> bool {
    !value.trim().is_empty()
}

/// A layer that may or may not supply a value for each media slot
pub trait MediaSource {
    /// Raw value stored for `slot`, if any (may still be blank)
    fn slot_value(&self, slot: MediaSlot) -> Option<&str>;
}

/// Fully populated site configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfiguration {
    pub logo_url: String,
    pub hero_video_url: String,
    pub fight_video_url: String,
    pub gloves_image_url: String,
    pub evolution_image_url: String,
    pub revenue_image_url: String,
}

impl SiteConfiguration {
    /// Compiled-in defaults. Every slot is non-empty.
    pub fn compiled_defaults() -> Self {
        Self {
            logo_url: DEFAULT_LOGO_URL.to_string(),
            hero_video_url: DEFAULT_HERO_VIDEO_URL.to_string(),
            fight_video_url: DEFAULT_FIGHT_VIDEO_URL.to_string(),
            gloves_image_url: DEFAULT_GLOVES_IMAGE_URL.to_string(),
            evolution_image_url: DEFAULT_EVOLUTION_IMAGE_URL.to_string(),
            revenue_image_url: DEFAULT_REVENUE_IMAGE_URL.to_string(),
        }
    }

    pub fn slot(&self, slot: MediaSlot) -> &str {
        match slot {
            MediaSlot::Logo => &self.logo_url,
            MediaSlot::HeroVideo => &self.hero_video_url,
            MediaSlot::FightVideo => &self.fight_video_url,
            MediaSlot::GlovesImage => &self.gloves_image_url,
            MediaSlot::EvolutionImage => &self.evolution_image_url,
            MediaSlot::RevenueImage => &self.revenue_image_url,
        }
    }

    pub fn set_slot(&mut self, slot: MediaSlot, value: impl Into<String>) {
        let value = value.into();
        match slot {
            MediaSlot::Logo => self.logo_url = value,
            MediaSlot::HeroVideo => self.hero_video_url = value,
            MediaSlot::FightVideo => self.fight_video_url = value,
            MediaSlot::GlovesImage => self.gloves_image_url = value,
            MediaSlot::EvolutionImage => self.evolution_image_url = value,
            MediaSlot::RevenueImage => self.revenue_image_url = value,
        }
    }

    /// Slots whose value is blank
    pub fn blank_slots(&self) -> Vec<MediaSlot> {
        MediaSlot::ALL
            .into_iter()
            .filter(|slot| !is_usable(self.slot(*slot)))
            .collect()
    }
}

impl Default for SiteConfiguration {
    fn default() -> Self {
        Self::compiled_defaults()
    }
}

impl MediaSource for SiteConfiguration {
    fn slot_value(&self, slot: MediaSlot) -> Option<&str> {
        Some(self.slot(slot))
    }
}

/// Locally cached configuration
///
/// Decoding is lenient: fields absent from older cache entries are `None`
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSiteConfiguration {
    pub logo_url: Option<String>,
    pub hero_video_url: Option<String>,
    pub fight_video_url: Option<String>,
    pub gloves_image_url: Option<String>,
    pub evolution_image_url: Option<String>,
    pub revenue_image_url: Option<String>,
}

impl MediaSource for PartialSiteConfiguration {
    fn slot_value(&self, slot: MediaSlot) -> Option<&str> {
        let value = match slot {
            MediaSlot::Logo => &self.logo_url,
            MediaSlot::HeroVideo => &self.hero_video_url,
            MediaSlot::FightVideo => &self.fight_video_url,
            MediaSlot::GlovesImage => &self.gloves_image_url,
            MediaSlot::EvolutionImage => &self.evolution_image_url,
            MediaSlot::RevenueImage => &self.revenue_image_url,
        };
        value.as_deref()
    }
}

impl From<&SiteConfiguration> for PartialSiteConfiguration {
    fn from(config: &SiteConfiguration) -> Self {
        Self {
            logo_url: Some(config.logo_url.clone()),
            hero_video_url: Some(config.hero_video_url.clone()),
            fight_video_url: Some(config.fight_video_url.clone()),
            gloves_image_url: Some(config.gloves_image_url.clone()),
            evolution_image_url: Some(config.evolution_image_url.clone()),
            revenue_image_url: Some(config.revenue_image_url.clone()),
        }
    }
}

/// Singleton row of the remote `site_settings` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettingsRow {
    #[serde(default = "singleton_id")]
    pub id: i64,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub hero_video_url: Option<String>,
    #[serde(default)]
    pub fight_video_url: Option<String>,
    #[serde(default)]
    pub gloves_image_url: Option<String>,
    #[serde(default)]
    pub evolution_image_url: Option<String>,
    #[serde(default)]
    pub revenue_image_url: Option<String>,
}

fn singleton_id() -> i64 {
    SITE_SETTINGS_ID
}

impl MediaSource for SiteSettingsRow {
    fn slot_value(&self, slot: MediaSlot) -> Option<&str> {
        let value = match slot {
            MediaSlot::Logo => &self.logo_url,
            MediaSlot::HeroVideo => &self.hero_video_url,
            MediaSlot::FightVideo => &self.fight_video_url,
            MediaSlot::GlovesImage => &self.gloves_image_url,
            MediaSlot::EvolutionImage => &self.evolution_image_url,
            MediaSlot::RevenueImage => &self.revenue_image_url,
        };
        value.as_deref()
    }
}

impl From<&SiteConfiguration> for SiteSettingsRow {
    /// Upsert payload, always keyed by the fixed singleton id
    fn from(config: &SiteConfiguration) -> Self {
        Self {
            id: SITE_SETTINGS_ID,
            logo_url: Some(config.logo_url.clone()),
            hero_video_url: Some(config.hero_video_url.clone()),
            fight_video_url: Some(config.fight_video_url.clone()),
            gloves_image_url: Some(config.gloves_image_url.clone()),
            evolution_image_url: Some(config.evolution_image_url.clone()),
            revenue_image_url: Some(config.revenue_image_url.clone()),
        }
    }
}
