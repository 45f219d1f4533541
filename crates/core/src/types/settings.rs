//! The site settings record and its declared field table.
//!
//! Every field is declared exactly once in the `site_settings!` invocation
//! below: wire name, kind, group and default. The record struct, the
//! [`SettingsField`] enum, and the field-by-field accessors are generated from
//! that single table, so the merge in [`SiteSettings::from_payload`] always
//! covers every field.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::field::{FieldError, FieldKind, SettingsGroup};
use super::value::{FieldType, FieldValue};

/// Payload key of the optional record identifier.
pub const ID_KEY: &str = "id";

macro_rules! field_type {
    (Text) => { String };
    (Number) => { Decimal };
}

macro_rules! field_default {
    (Text, $default:expr) => {
        String::from($default)
    };
    (Number, $default:expr) => {
        Decimal::from($default)
    };
}

macro_rules! site_settings {
    (
        $(
            $group:ident {
                $( $variant:ident => $field:ident : $kind:ident = $default:expr ),+ $(,)?
            }
        )+
    ) => {
        /// A named field of [`SiteSettings`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SettingsField {
            $( $( #[allow(missing_docs)] $variant, )+ )+
        }

        impl SettingsField {
            /// Every field, in declaration order.
            pub const ALL: &'static [Self] = &[ $( $( Self::$variant, )+ )+ ];

            /// Wire name used in payloads and forms.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( $( Self::$variant => stringify!($field), )+ )+
                }
            }

            /// Declared kind of the field.
            #[must_use]
            pub const fn kind(self) -> FieldKind {
                match self {
                    $( $( Self::$variant => FieldKind::$kind, )+ )+
                }
            }

            /// Logical group the field belongs to.
            #[must_use]
            pub const fn group(self) -> SettingsGroup {
                match self {
                    $( $( Self::$variant => SettingsGroup::$group, )+ )+
                }
            }
        }

        /// Storefront site settings.
        ///
        /// Always fully populated: there is no "unset" field. `id` is present
        /// only on records that came back from the store with one.
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[allow(missing_docs)]
        pub struct SiteSettings {
            pub id: Option<String>,
            $( $( pub $field: field_type!($kind), )+ )+
        }

        impl Default for SiteSettings {
            fn default() -> Self {
                Self {
                    id: None,
                    $( $( $field: field_default!($kind, $default), )+ )+
                }
            }
        }

        impl SiteSettings {
            /// Read one field.
            #[must_use]
            pub fn get(&self, field: SettingsField) -> FieldValue {
                match field {
                    $( $( SettingsField::$variant => self.$field.to_value(), )+ )+
                }
            }

            /// Replace one field, coercing the value to the field's kind.
            ///
            /// # Errors
            ///
            /// Returns `FieldError::TypeMismatch` or `FieldError::InvalidNumber`
            /// when the value cannot be stored in the field. The record is left
            /// unchanged on error.
            pub fn set(&mut self, field: SettingsField, value: FieldValue) -> Result<(), FieldError> {
                match field {
                    $( $(
                        SettingsField::$variant => {
                            self.$field = FieldType::from_value(field.name(), value)?;
                        }
                    )+ )+
                }
                Ok(())
            }
        }
    };
}

site_settings! {
    Identity {
        StoreName => store_name: Text = "دريم للتجارة",
        StoreNameEn => store_name_en: Text = "Dream For Trade",
        StoreLogo => store_logo: Text = "/logo.png",
        StoreDescription => store_description: Text = "الوكيل المعتمد لأكبر الماركات العالمية للتكييفات",
        StoreSlogan => store_slogan: Text = "راحتك... حلمنا",
    }
    Contact {
        StoreAddress => store_address: Text = "القاهرة، مصر",
        StorePhone => store_phone: Text = "01289006310",
        StorePhoneAlt => store_phone_alt: Text = "",
        StoreEmail => store_email: Text = "info@dreamfortrade.com",
        StoreWhatsapp => store_whatsapp: Text = "201289006310",
        WhatsappMessage => whatsapp_message: Text = "مرحباً، أريد الاستفسار عن منتجاتكم",
        WorkingHoursFrom => working_hours_from: Text = "09:00",
        WorkingHoursTo => working_hours_to: Text = "21:00",
        WorkingDays => working_days: Text = "السبت - الخميس",
    }
    Social {
        FacebookUrl => facebook_url: Text = "",
        InstagramUrl => instagram_url: Text = "",
        TiktokUrl => tiktok_url: Text = "",
        TwitterUrl => twitter_url: Text = "",
        YoutubeUrl => youtube_url: Text = "",
        LinkedinUrl => linkedin_url: Text = "",
        SnapchatUrl => snapchat_url: Text = "",
        TelegramUrl => telegram_url: Text = "",
    }
    Analytics {
        GoogleAnalyticsId => google_analytics_id: Text = "",
        GoogleTagManagerId => google_tag_manager_id: Text = "",
        GoogleSearchConsole => google_search_console: Text = "",
        GoogleMerchantId => google_merchant_id: Text = "",
        FacebookPixelId => facebook_pixel_id: Text = "",
        TiktokPixelId => tiktok_pixel_id: Text = "",
        SnapchatPixelId => snapchat_pixel_id: Text = "",
    }
    Shipping {
        DeliveryFeeCairo => delivery_fee_cairo: Number = 50,
        DeliveryFeeGiza => delivery_fee_giza: Number = 50,
        DeliveryFeeAlex => delivery_fee_alex: Number = 100,
        DeliveryFeeOther => delivery_fee_other: Number = 150,
        FreeShippingThreshold => free_shipping_threshold: Number = 10_000,
        DeliveryMessage => delivery_message: Text = "التوصيل خلال 2-5 أيام عمل",
    }
    Seo {
        SeoTitle => seo_title: Text = "دريم للتجارة - تكييفات بأفضل الأسعار",
        SeoDescription => seo_description: Text = "الوكيل المعتمد لأكبر الماركات العالمية للتكييفات في مصر. كاريير، ميديا، شارب، فريش وأكثر.",
        SeoKeywords => seo_keywords: Text = "تكييف، تكييفات، كاريير، ميديا، شارب، فريش، مصر",
        OgImage => og_image: Text = "/og-image.jpg",
    }
    Content {
        HomepageHeroTitle => homepage_hero_title: Text = "تكييفات بأفضل الأسعار",
        HomepageHeroSubtitle => homepage_hero_subtitle: Text = "اكتشف مجموعتنا الواسعة من التكييفات العالمية",
        AboutContent => about_content: Text = "",
        FooterText => footer_text: Text = "جميع الحقوق محفوظة © دريم للتجارة",
    }
}

impl SettingsField {
    /// Look up a field by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }

    /// Fields belonging to one group, in declaration order.
    pub fn in_group(group: SettingsGroup) -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(move |field| field.group() == group)
    }
}

impl core::fmt::Display for SettingsField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingsField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| FieldError::UnknownField(s.to_owned()))
    }
}

impl Serialize for SettingsField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Errors decoding a stored settings payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is not a JSON object.
    #[error("settings payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Result of merging a stored payload onto the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// The fully populated record.
    pub settings: SiteSettings,
    /// Present fields whose stored value could not be used; these kept
    /// their defaults.
    pub rejected: Vec<FieldError>,
}

impl SiteSettings {
    /// Set a field by wire name.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::UnknownField` for undeclared names, otherwise the
    /// errors of [`SiteSettings::set`].
    pub fn set_named(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError> {
        let field: SettingsField = name.parse()?;
        self.set(field, value)
    }

    /// Encode the full record as a JSON object keyed by wire name.
    #[must_use]
    pub fn to_payload(&self) -> JsonMap<String, JsonValue> {
        let mut map = JsonMap::with_capacity(SettingsField::ALL.len() + 1);
        if let Some(id) = &self.id {
            map.insert(ID_KEY.to_owned(), JsonValue::String(id.clone()));
        }
        for &field in SettingsField::ALL {
            map.insert(field.name().to_owned(), self.get(field).to_json());
        }
        map
    }

    /// Merge a stored payload onto the defaults, field by field.
    ///
    /// Each declared field takes the stored value when present and coercible
    /// to the field's kind; otherwise it keeps its default. Unknown keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::NotAnObject` if the payload is not a JSON object.
    pub fn from_payload(payload: &JsonValue) -> Result<MergeReport, PayloadError> {
        let JsonValue::Object(map) = payload else {
            return Err(PayloadError::NotAnObject(json_type_name(payload)));
        };

        let mut settings = Self::default();
        let mut rejected = Vec::new();

        if let Some(JsonValue::String(id)) = map.get(ID_KEY) {
            settings.id = Some(id.clone());
        }

        for &field in SettingsField::ALL {
            let Some(raw) = map.get(field.name()) else {
                continue;
            };
            let result = FieldValue::from_json(raw)
                .ok_or_else(|| FieldError::UnsupportedValue {
                    field: field.name().to_owned(),
                })
                .and_then(|value| settings.set(field, value));
            if let Err(e) = result {
                rejected.push(e);
            }
        }

        Ok(MergeReport { settings, rejected })
    }

    /// Build a record from a complete edit payload, strictly.
    ///
    /// Missing fields take their defaults, but unknown keys and values that
    /// do not fit their field are errors rather than being skipped.
    ///
    /// # Errors
    ///
    /// Returns the first `FieldError` encountered.
    pub fn from_edits(edits: &JsonMap<String, JsonValue>) -> Result<Self, FieldError> {
        let mut settings = Self::default();
        for (name, raw) in edits {
            if name == ID_KEY {
                match raw {
                    JsonValue::String(id) => settings.id = Some(id.clone()),
                    JsonValue::Null => settings.id = None,
                    _ => {
                        return Err(FieldError::UnsupportedValue {
                            field: ID_KEY.to_owned(),
                        });
                    }
                }
                continue;
            }
            let value = FieldValue::from_json(raw)
                .ok_or_else(|| FieldError::UnsupportedValue { field: name.clone() })?;
            settings.set_named(name, value)?;
        }
        Ok(settings)
    }

    /// Fields whose values differ between two records, in declaration order.
    #[must_use]
    pub fn changed_fields(&self, other: &Self) -> Vec<SettingsField> {
        SettingsField::ALL
            .iter()
            .copied()
            .filter(|&field| self.get(field) != other.get(field))
            .collect()
    }
}

impl Serialize for SiteSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

const fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = SiteSettings::default();
        assert_eq!(settings.id, None);
        assert_eq!(settings.store_name_en, "Dream For Trade");
        assert_eq!(settings.delivery_fee_cairo, Decimal::from(50));
        assert_eq!(settings.delivery_fee_giza, Decimal::from(50));
        assert_eq!(settings.delivery_fee_alex, Decimal::from(100));
        assert_eq!(settings.delivery_fee_other, Decimal::from(150));
        assert_eq!(settings.free_shipping_threshold, Decimal::from(10_000));
        assert_eq!(settings.og_image, "/og-image.jpg");
        assert!(settings.facebook_url.is_empty());
    }

    #[test]
    fn test_field_table() {
        assert_eq!(SettingsField::ALL.len(), 43);
        assert_eq!(SettingsField::ALL[0], SettingsField::StoreName);
        assert_eq!(SettingsField::DeliveryFeeCairo.name(), "delivery_fee_cairo");
        assert_eq!(SettingsField::DeliveryFeeCairo.kind(), FieldKind::Number);
        assert_eq!(SettingsField::DeliveryMessage.kind(), FieldKind::Text);
        assert_eq!(SettingsField::TelegramUrl.group(), SettingsGroup::Social);

        let numeric: Vec<_> = SettingsField::ALL
            .iter()
            .filter(|f| f.kind() == FieldKind::Number)
            .map(|f| f.name())
            .collect();
        assert_eq!(
            numeric,
            [
                "delivery_fee_cairo",
                "delivery_fee_giza",
                "delivery_fee_alex",
                "delivery_fee_other",
                "free_shipping_threshold",
            ]
        );
    }

    #[test]
    fn test_field_names_are_unique_and_parse_back() {
        for &field in SettingsField::ALL {
            assert_eq!(field.name().parse::<SettingsField>().unwrap(), field);
        }
        let mut names: Vec<_> = SettingsField::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SettingsField::ALL.len());
    }

    #[test]
    fn test_every_group_has_fields() {
        for &group in SettingsGroup::ALL {
            assert!(SettingsField::in_group(group).next().is_some(), "{group} is empty");
        }
    }

    #[test]
    fn test_unknown_field_name() {
        assert_eq!(
            "store_nmae".parse::<SettingsField>(),
            Err(FieldError::UnknownField("store_nmae".to_string()))
        );
    }

    #[test]
    fn test_set_single_field_isolation() {
        let before = SiteSettings::default();
        let mut after = before.clone();
        after
            .set(SettingsField::DeliveryFeeCairo, FieldValue::from(75))
            .unwrap();

        assert_eq!(after.delivery_fee_cairo, Decimal::from(75));
        assert_eq!(after.changed_fields(&before), [SettingsField::DeliveryFeeCairo]);
    }

    #[test]
    fn test_rejected_set_leaves_record_unchanged() {
        let before = SiteSettings::default();
        let mut after = before.clone();

        assert!(after.set(SettingsField::StoreName, FieldValue::from(1)).is_err());
        assert!(after.set_named("delivery_fee_giza", FieldValue::from("free")).is_err());
        assert!(after.set_named("no_such_field", FieldValue::from("x")).is_err());
        assert_eq!(after, before);
    }

    #[test]
    fn test_merge_partial_payload() {
        let report = SiteSettings::from_payload(&json!({ "store_name": "Acme" })).unwrap();
        assert!(report.rejected.is_empty());

        let mut expected = SiteSettings::default();
        expected.store_name = "Acme".to_string();
        assert_eq!(report.settings, expected);
        assert_eq!(report.settings.delivery_fee_giza, Decimal::from(50));
    }

    #[test]
    fn test_merge_keeps_defaults_for_bad_values() {
        let payload = json!({
            "id": "row-1",
            "store_phone": 12345,
            "delivery_fee_alex": "120",
            "delivery_fee_other": "lots",
            "seo_title": null,
            "legacy_field": "ignored",
        });
        let report = SiteSettings::from_payload(&payload).unwrap();
        let defaults = SiteSettings::default();

        assert_eq!(report.settings.id.as_deref(), Some("row-1"));
        assert_eq!(report.settings.store_phone, defaults.store_phone);
        assert_eq!(report.settings.delivery_fee_alex, Decimal::from(120));
        assert_eq!(report.settings.delivery_fee_other, defaults.delivery_fee_other);
        assert_eq!(report.settings.seo_title, defaults.seo_title);
        assert_eq!(report.rejected.len(), 3);
    }

    #[test]
    fn test_merge_non_object_payload() {
        assert_eq!(
            SiteSettings::from_payload(&json!("not an object")),
            Err(PayloadError::NotAnObject("string"))
        );
        assert!(SiteSettings::from_payload(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_payload_roundtrip_preserves_record() {
        let mut settings = SiteSettings::default();
        settings.id = Some("abc".to_string());
        settings.instagram_url = "https://instagram.com/dream".to_string();
        settings.delivery_fee_cairo = Decimal::new(7550, 2);

        let payload = JsonValue::Object(settings.to_payload());
        assert_eq!(payload["delivery_fee_cairo"], json!(75.5));
        assert_eq!(payload["delivery_fee_giza"], json!(50));

        let report = SiteSettings::from_payload(&payload).unwrap();
        assert_eq!(report.settings, settings);
    }

    #[test]
    fn test_payload_omits_missing_id() {
        let payload = SiteSettings::default().to_payload();
        assert!(!payload.contains_key(ID_KEY));
        assert_eq!(payload.len(), SettingsField::ALL.len());
    }

    #[test]
    fn test_from_edits_is_strict() {
        let edits = json!({ "store_name": "Acme", "delivery_fee_cairo": 80 });
        let settings = SiteSettings::from_edits(edits.as_object().unwrap()).unwrap();
        assert_eq!(settings.store_name, "Acme");
        assert_eq!(settings.delivery_fee_cairo, Decimal::from(80));
        assert_eq!(settings.store_name_en, "Dream For Trade");

        let edits = json!({ "store_nam": "Acme" });
        assert!(matches!(
            SiteSettings::from_edits(edits.as_object().unwrap()),
            Err(FieldError::UnknownField(_))
        ));

        let edits = json!({ "footer_text": ["a"] });
        assert!(matches!(
            SiteSettings::from_edits(edits.as_object().unwrap()),
            Err(FieldError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_serialize_matches_payload() {
        let settings = SiteSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json, JsonValue::Object(settings.to_payload()));
        assert_eq!(
            serde_json::to_value(SettingsField::FooterText).unwrap(),
            json!("footer_text")
        );
    }
}
