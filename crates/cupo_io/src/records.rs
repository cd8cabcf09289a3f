//! Loose source records → validated core types.
//!
//! Upstream exports disagree on field names ("cedula" vs "identificacion",
//! "puntaje" vs "puntaje_postulacion", comma decimals, numeric segment
//! codes). All of that is absorbed here, once; downstream crates only see
//! the validated core types. Only the lifecycle state is strict: a token
//! outside the known set is an ingestion error, not a silently-eligible
//! candidate.

use serde::Deserialize;
use serde_json::Value;

use cupo_core::domain::{Pct, Score};
use cupo_core::determinism::is_ts_utc_z;
use cupo_core::entities::{Candidate, CandidateState, Program, Segment};
use cupo_core::ids::norm_text;

use crate::{IoError, IoResult};

/// Numeric segment codes used by legacy candidate exports.
const SEGMENT_CODES: &[(&str, &str)] = &[
    ("1", "Población general"),
    ("2", "Política de cuotas"),
    ("3", "Vulnerabilidad socioeconómica"),
    ("4", "Mérito académico"),
    ("5", "Bachilleres"),
];

/// Candidate record as it appears in heterogeneous sources. Unknown fields
/// are ignored; known fields accept every historical alias.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    #[serde(alias = "identificacion", alias = "identificiacion", alias = "ident", alias = "id")]
    pub cedula: Option<Value>,
    #[serde(alias = "nombres")]
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    #[serde(alias = "puntaje_postulacion", alias = "puntaje_post")]
    pub puntaje: Option<Value>,
    pub estado: Option<String>,
    /// Single declared token (text or numeric code).
    pub segmento: Option<Value>,
    /// Multiple declared tokens.
    pub segmentos: Option<Vec<Value>>,
    pub prioridad: Option<Value>,
    pub vulnerabilidad: Option<String>,
    pub fecha_inscripcion: Option<String>,
    #[serde(alias = "politica")]
    pub politica_cuotas: Option<bool>,
    pub bachiller_ultimo_regimen: Option<bool>,
    #[serde(alias = "nombre_carrera", alias = "carrera")]
    pub carrera_postulada: Option<String>,
    #[serde(alias = "can_nombre", alias = "sede")]
    pub campus: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSegment {
    pub nombre: String,
    pub porcentaje: Option<Value>,
    #[serde(alias = "prioridad")]
    pub orden: Option<Value>,
    pub min_pct: Option<Value>,
    pub max_pct: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProgram {
    #[serde(alias = "id")]
    pub id_carrera: String,
    pub nombre: String,
    #[serde(alias = "oferta")]
    pub oferta_cupos: Option<Value>,
    #[serde(alias = "sede")]
    pub campus: Option<String>,
    pub segmentos: Vec<RawSegment>,
}

/* ---------------------------- value coercion ---------------------------- */

/// Number, or a string with either decimal separator ("85,5" / "85.5").
fn value_to_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().replace(',', ".");
            if s.is_empty() { None } else { s.parse().ok() }
        }
        _ => None,
    }
}

fn value_to_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: Option<&String>) -> Option<String> {
    s.map(|x| x.trim()).filter(|x| !x.is_empty()).map(Into::into)
}

/// Numeric segment codes become canonical names; text tokens pass through.
fn segment_token(v: &Value) -> Option<String> {
    let raw = value_to_string(Some(v))?;
    let mapped = SEGMENT_CODES
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, name)| (*name).to_string());
    Some(mapped.unwrap_or(raw))
}

/// Lifecycle tokens, Spanish or English, case-insensitive. Anything else is
/// an ingestion contract breach.
fn parse_state(raw: Option<&str>, index: usize) -> IoResult<CandidateState> {
    let token = raw.map(norm_text).unwrap_or_default();
    match token.as_str() {
        "" | "postulado" | "postulacion" | "postulación" | "inscrito" | "applied" => {
            Ok(CandidateState::Applied)
        }
        "asignado" | "assigned" => Ok(CandidateState::Assigned),
        "aceptado" | "accepted" => Ok(CandidateState::Accepted),
        "rechazado" | "rejected" => Ok(CandidateState::Rejected),
        other => Err(IoError::Record {
            index,
            msg: format!("unknown lifecycle state: {other:?}"),
        }),
    }
}

/// "alta"/"media"/"baja" → tier 0/1/2; anything else is no tier at all.
fn parse_vulnerability(raw: Option<&str>) -> Option<u8> {
    match raw.map(norm_text).as_deref() {
        Some("alta") => Some(0),
        Some("media") => Some(1),
        Some("baja") => Some(2),
        _ => None,
    }
}

/* ---------------------------- normalization ----------------------------- */

/// Build a validated `Candidate`. The identifier is the only hard
/// requirement; everything else degrades to the documented defaults.
pub fn normalize_candidate(raw: &RawCandidate, index: usize) -> IoResult<Candidate> {
    let ced = value_to_string(raw.cedula.as_ref()).ok_or(IoError::Record {
        index,
        msg: "missing candidate identifier".into(),
    })?;
    let id = ced.trim().parse().map_err(|_| IoError::Record {
        index,
        msg: format!("invalid candidate identifier: {ced:?}"),
    })?;

    let score = value_to_f64(raw.puntaje.as_ref())
        .map(Score::from_f64)
        .unwrap_or(Score::ZERO);

    let mut c = Candidate::new(id, score);
    c.name = match (non_empty(raw.nombre.as_ref()), non_empty(raw.apellidos.as_ref())) {
        (Some(n), Some(a)) => format!("{n} {a}"),
        (Some(n), None) => n,
        (None, Some(a)) => a,
        (None, None) => String::new(),
    };
    c.state = parse_state(raw.estado.as_deref(), index)?;

    c.segments = match (&raw.segmentos, &raw.segmento) {
        (Some(list), _) => list.iter().filter_map(segment_token).collect(),
        (None, Some(one)) => segment_token(one).into_iter().collect(),
        (None, None) => Vec::new(),
    };

    c.priority = value_to_f64(raw.prioridad.as_ref())
        .filter(|p| (0.0..=255.0).contains(p) && *p >= 1.0)
        .map(|p| p as u8)
        .unwrap_or(2);
    c.vulnerability = parse_vulnerability(raw.vulnerabilidad.as_deref());
    c.enrolled_at = non_empty(raw.fecha_inscripcion.as_ref()).filter(|t| is_ts_utc_z(t));
    c.quota_policy = raw.politica_cuotas.unwrap_or(false);
    c.recent_graduate = raw.bachiller_ultimo_regimen.unwrap_or(false);
    c.program_applied = non_empty(raw.carrera_postulada.as_ref());
    c.campus = non_empty(raw.campus.as_ref());
    Ok(c)
}

fn normalize_segment(raw: &RawSegment, priority_fallback: u32) -> Segment {
    let pct = value_to_f64(raw.porcentaje.as_ref())
        .map(Pct::from_percent_f64)
        .unwrap_or(Pct::ZERO);
    let priority = value_to_f64(raw.orden.as_ref())
        .filter(|o| *o >= 0.0)
        .map(|o| o as u32)
        .unwrap_or(priority_fallback);

    let mut seg = Segment::new(raw.nombre.as_str(), pct, priority);
    seg.min_pct = value_to_f64(raw.min_pct.as_ref()).map(Pct::from_percent_f64);
    seg.max_pct = value_to_f64(raw.max_pct.as_ref()).map(Pct::from_percent_f64);
    seg
}

/// Build a validated `Program`. Duplicate segment names are a configuration
/// anomaly and are dropped (first declaration wins).
pub fn normalize_program(raw: &RawProgram, index: usize) -> IoResult<Program> {
    let id = raw.id_carrera.trim().parse().map_err(|_| IoError::Record {
        index,
        msg: format!("invalid program identifier: {:?}", raw.id_carrera),
    })?;
    let offer = value_to_f64(raw.oferta_cupos.as_ref())
        .filter(|o| *o >= 0.0)
        .map(|o| o as u32)
        .unwrap_or(0);

    let mut p = Program::new(id, raw.nombre.trim(), offer);
    p.campus = non_empty(raw.campus.as_ref());
    for (i, rs) in raw.segmentos.iter().enumerate() {
        // declaration order is the priority fallback
        let _ = p.add_segment(normalize_segment(rs, i as u32 + 1));
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: serde_json::Value) -> RawCandidate {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn aliases_and_comma_decimals_are_absorbed() {
        let c = normalize_candidate(
            &raw(json!({
                "identificacion": "0912345678",
                "nombres": "María", "apellidos": "Zamora",
                "puntaje_postulacion": "850,5",
                "estado": "Postulado",
                "segmento": "4",
                "can_nombre": "Manta"
            })),
            0,
        )
        .unwrap();
        assert_eq!(c.id.as_str(), "0912345678");
        assert_eq!(c.name, "María Zamora");
        assert_eq!(c.score, Score::from_f64(850.5));
        assert_eq!(c.segments, vec!["Mérito académico".to_string()]);
        assert_eq!(c.campus.as_deref(), Some("Manta"));
        assert_eq!(c.state, CandidateState::Applied);
    }

    #[test]
    fn missing_optional_fields_degrade_to_defaults() {
        let c = normalize_candidate(&raw(json!({ "cedula": "C1" })), 3).unwrap();
        assert_eq!(c.score, Score::ZERO);
        assert_eq!(c.priority, 2);
        assert!(c.segments.is_empty());
        assert_eq!(c.state, CandidateState::Applied);
        assert_eq!(c.vulnerability, None);
    }

    #[test]
    fn missing_identifier_is_an_error() {
        let err = normalize_candidate(&raw(json!({ "puntaje": 900 })), 7).unwrap_err();
        assert!(matches!(err, IoError::Record { index: 7, .. }));
    }

    #[test]
    fn unknown_lifecycle_state_is_an_error() {
        let err =
            normalize_candidate(&raw(json!({ "cedula": "C1", "estado": "Matriculado" })), 1)
                .unwrap_err();
        assert!(err.to_string().contains("lifecycle"));
    }

    #[test]
    fn vulnerability_tiers_and_timestamps() {
        let c = normalize_candidate(
            &raw(json!({
                "cedula": "C1",
                "vulnerabilidad": "Alta",
                "fecha_inscripcion": "2025-01-10T08:00:00Z"
            })),
            0,
        )
        .unwrap();
        assert_eq!(c.vulnerability, Some(0));
        assert_eq!(c.enrolled_at.as_deref(), Some("2025-01-10T08:00:00Z"));

        let d = normalize_candidate(
            &raw(json!({ "cedula": "C2", "fecha_inscripcion": "10/01/2025" })),
            0,
        )
        .unwrap();
        assert_eq!(d.enrolled_at, None); // malformed timestamps degrade
    }

    #[test]
    fn program_with_duplicate_segments_keeps_the_first() {
        let rp: RawProgram = serde_json::from_value(json!({
            "id_carrera": "001",
            "nombre": "Software",
            "oferta_cupos": 10,
            "segmentos": [
                { "nombre": "Mérito", "porcentaje": 30, "orden": 1 },
                { "nombre": "MÉRITO", "porcentaje": 20, "orden": 2 },
                { "nombre": "Población general", "porcentaje": "70", "orden": 3 }
            ]
        }))
        .unwrap();
        let p = normalize_program(&rp, 0).unwrap();
        assert_eq!(p.segments.len(), 2);
        assert_eq!(p.offer, 10);
        assert_eq!(p.seats.len(), 10);
    }

    #[test]
    fn non_numeric_percentage_becomes_zero() {
        let rp: RawProgram = serde_json::from_value(json!({
            "id_carrera": "001",
            "nombre": "Software",
            "oferta": 5,
            "segmentos": [{ "nombre": "Mérito", "porcentaje": "n/a" }]
        }))
        .unwrap();
        let p = normalize_program(&rp, 0).unwrap();
        assert!(p.segments[0].percent.is_zero());
    }
}
