use std::str::FromStr;

use strum::{EnumIter, EnumString};

/// Closed set of composite object types whose subfield selections are
/// maintained by hand. GraphQL forbids selecting an object field without
/// subfields, and guessing subfields produces a server-side validation
/// error, so an object type missing from this registry is skipped entirely.
///
/// Not extensible at runtime: a new composite type on the server requires a
/// code change here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString)]
pub enum ComplexType {
    Links,
    Address,
    Currency,
    Actor,
    WorkspaceMember,
    FullName,
    Emails,
    Phones,
}

impl ComplexType {
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        ComplexType::from_str(type_name).ok()
    }

    /// The literal subfield selection for this type. Every fragment is
    /// self-contained: any nested object field carries its own subfields.
    pub fn subfields(&self) -> &'static str {
        match self {
            ComplexType::Links => "primaryLinkLabel\nprimaryLinkUrl\nsecondaryLinks",
            ComplexType::Address => {
                "addressStreet1\naddressStreet2\naddressCity\naddressState\naddressCountry\naddressPostcode\naddressLat\naddressLng"
            }
            ComplexType::Currency => "amountMicros\ncurrencyCode",
            ComplexType::Actor => "source\nworkspaceMemberId\nname",
            ComplexType::WorkspaceMember => "id\nname {\n\tfirstName\n\tlastName\n}\nuserEmail",
            ComplexType::FullName => "firstName\nlastName",
            ComplexType::Emails => "primaryEmail\nadditionalEmails",
            ComplexType::Phones => {
                "primaryPhoneNumber\nprimaryPhoneCountryCode\nprimaryPhoneCallingCode\nadditionalPhones"
            }
        }
    }
}
