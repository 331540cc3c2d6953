//! Flattened entity records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column names, in export order
pub const COLUMNS: [&str; 15] = [
    "organisasjonsnummer",
    "navn",
    "organisasjonsform",
    "registreringsdatoEnhetsregisteret",
    "naeringskode1",
    "forretningsadresse",
    "postnummer",
    "poststed",
    "kommune",
    "kommunenummer",
    "epostadresse",
    "telefon",
    "hjemmeside",
    "stiftelsesdato",
    "sisteInnsendteAarsregnskap",
];

/// One entity from a search result, reduced to flat text columns
///
/// Nested objects are reduced to their description (`organisasjonsform`,
/// `naeringskode1`) or split into address columns. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EntityRecord {
    pub organisasjonsnummer: String,
    pub navn: String,
    pub organisasjonsform: String,
    pub registreringsdato_enhetsregisteret: String,
    pub naeringskode1: String,
    pub forretningsadresse: String,
    pub postnummer: String,
    pub poststed: String,
    pub kommune: String,
    pub kommunenummer: String,
    pub epostadresse: String,
    pub telefon: String,
    pub hjemmeside: String,
    pub stiftelsesdato: String,
    pub siste_innsendte_aarsregnskap: String,
}

impl EntityRecord {
    /// Flatten every entity of an entity search response
    ///
    /// A response without `_embedded.enheter` (no hits) yields no records.
    pub fn flatten(search_response: &Value) -> Vec<Self> {
        search_response
            .pointer("/_embedded/enheter")
            .and_then(Value::as_array)
            .map(|entities| entities.iter().map(Self::from_entity).collect())
            .unwrap_or_default()
    }

    /// Flatten one entity object
    pub fn from_entity(entity: &Value) -> Self {
        let address = &entity["forretningsadresse"];
        let address_lines = address["adresse"]
            .as_array()
            .map(|lines| {
                lines
                    .iter()
                    .map(text)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        Self {
            organisasjonsnummer: text(&entity["organisasjonsnummer"]),
            navn: text(&entity["navn"]),
            organisasjonsform: text(&entity["organisasjonsform"]["beskrivelse"]),
            registreringsdato_enhetsregisteret: text(&entity["registreringsdatoEnhetsregisteret"]),
            naeringskode1: text(&entity["naeringskode1"]["beskrivelse"]),
            forretningsadresse: address_lines,
            postnummer: text(&address["postnummer"]),
            poststed: text(&address["poststed"]),
            kommune: text(&address["kommune"]),
            kommunenummer: text(&address["kommunenummer"]),
            epostadresse: text(&entity["epostadresse"]),
            telefon: text(&entity["telefon"]),
            hjemmeside: text(&entity["hjemmeside"]),
            stiftelsesdato: text(&entity["stiftelsesdato"]),
            siste_innsendte_aarsregnskap: text(&entity["sisteInnsendteAarsregnskap"]),
        }
    }

    /// Column values, in [`COLUMNS`] order
    pub fn values(&self) -> [&str; 15] {
        [
            self.organisasjonsnummer.as_str(),
            self.navn.as_str(),
            self.organisasjonsform.as_str(),
            self.registreringsdato_enhetsregisteret.as_str(),
            self.naeringskode1.as_str(),
            self.forretningsadresse.as_str(),
            self.postnummer.as_str(),
            self.poststed.as_str(),
            self.kommune.as_str(),
            self.kommunenummer.as_str(),
            self.epostadresse.as_str(),
            self.telefon.as_str(),
            self.hjemmeside.as_str(),
            self.stiftelsesdato.as_str(),
            self.siste_innsendte_aarsregnskap.as_str(),
        ]
    }
}

/// Scalar JSON value as text; objects, arrays and null become empty
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_response() -> Value {
        json!({
            "_embedded": {
                "enheter": [
                    {
                        "organisasjonsnummer": "923609016",
                        "navn": "EQUINOR ASA",
                        "organisasjonsform": { "kode": "ASA", "beskrivelse": "Allmennaksjeselskap" },
                        "registreringsdatoEnhetsregisteret": "1995-03-12",
                        "naeringskode1": { "kode": "06.100", "beskrivelse": "Utvinning av råolje" },
                        "forretningsadresse": {
                            "adresse": ["Forusbeen 50"],
                            "postnummer": "4035",
                            "poststed": "STAVANGER",
                            "kommune": "STAVANGER",
                            "kommunenummer": "1103"
                        },
                        "hjemmeside": "www.equinor.com",
                        "stiftelsesdato": "1972-09-18",
                        "sisteInnsendteAarsregnskap": "2023"
                    },
                    {
                        "organisasjonsnummer": "999999999",
                        "navn": "EQUINOR TEST AS"
                    }
                ]
            },
            "page": { "size": 20, "totalElements": 2 }
        })
    }

    #[test]
    fn test_flatten_search_response() {
        let records = EntityRecord::flatten(&search_response());
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.organisasjonsnummer, "923609016");
        assert_eq!(first.organisasjonsform, "Allmennaksjeselskap");
        assert_eq!(first.naeringskode1, "Utvinning av råolje");
        assert_eq!(first.forretningsadresse, "Forusbeen 50");
        assert_eq!(first.kommunenummer, "1103");
        assert_eq!(first.epostadresse, "");
        assert_eq!(first.siste_innsendte_aarsregnskap, "2023");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let records = EntityRecord::flatten(&search_response());
        let second = &records[1];
        assert_eq!(second.navn, "EQUINOR TEST AS");
        assert_eq!(second.organisasjonsform, "");
        assert_eq!(second.forretningsadresse, "");
        assert_eq!(second.poststed, "");
    }

    #[test]
    fn test_address_lines_joined() {
        let entity = json!({
            "forretningsadresse": { "adresse": ["c/o Regnskap AS", "Storgata 1"] }
        });
        assert_eq!(
            EntityRecord::from_entity(&entity).forretningsadresse,
            "c/o Regnskap AS, Storgata 1"
        );
    }

    #[test]
    fn test_no_hits_yield_no_records() {
        let response = json!({ "page": { "size": 20, "totalElements": 0 } });
        assert!(EntityRecord::flatten(&response).is_empty());
        assert!(EntityRecord::flatten(&Value::Null).is_empty());
    }

    #[test]
    fn test_serialized_keys_match_columns() {
        let value = serde_json::to_value(EntityRecord::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(object.contains_key(column), "missing {}", column);
        }
    }
}
