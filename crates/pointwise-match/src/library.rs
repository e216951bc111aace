//! Template library keyed by equipment type.
//!
//! Templates are authored as JSON definitions (or from the normalized points
//! of a reference piece of equipment) and validated when loaded, so a bad
//! pattern is reported before any matching runs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use pointwise_core::{
    EquipmentType, NormalizedPoint, ObjectType, PointFunction, PointSignature, Quantity,
    SignatureError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{MatchEngine, MatchReport};
use crate::error::LibraryError;
use crate::signature::{author_signature, to_signature};
use crate::stats::MatchStatistics;

/// Authored form of one template signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureDefinition {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_function: Option<PointFunction>,
    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl SignatureDefinition {
    pub fn build(&self) -> Result<PointSignature, SignatureError> {
        let mut sig = author_signature(&self.id, &self.pattern, self.required)?;
        sig.point_function = self.point_function;
        sig.object_type = self.object_type;
        sig.quantity = self.quantity;
        sig.units = self.units.clone();
        Ok(sig)
    }
}

/// Authored form of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    pub equipment_type: EquipmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub signatures: Vec<SignatureDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LibraryFile {
    templates: Vec<TemplateDefinition>,
}

/// A validated template: a named set of signatures for one equipment type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub name: String,
    pub equipment_type: EquipmentType,
    pub description: Option<String>,
    pub signatures: Vec<PointSignature>,
}

impl Template {
    pub fn from_definition(def: TemplateDefinition) -> Result<Self, LibraryError> {
        let mut seen = BTreeSet::new();
        let mut signatures = Vec::with_capacity(def.signatures.len());
        for s in &def.signatures {
            if !seen.insert(s.id.as_str()) {
                return Err(LibraryError::DuplicateSignature {
                    template: def.name.clone(),
                    id: s.id.clone(),
                });
            }
            let sig = s.build().map_err(|source| LibraryError::Signature {
                template: def.name.clone(),
                source,
            })?;
            signatures.push(sig);
        }
        Ok(Self {
            name: def.name,
            equipment_type: def.equipment_type,
            description: def.description,
            signatures,
        })
    }

    /// Author a template from the normalized points of a reference piece of
    /// equipment. Points without significant keywords are skipped, as are
    /// repeated identifiers.
    pub fn from_points(
        name: impl Into<String>,
        equipment_type: EquipmentType,
        points: &[NormalizedPoint],
        is_required: impl Fn(&NormalizedPoint) -> bool,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let mut signatures = Vec::new();
        for point in points {
            if !seen.insert(point.original_name.as_str()) {
                continue;
            }
            match to_signature(point, is_required(point)) {
                Ok(sig) => signatures.push(sig),
                Err(e) => debug!(point = %point.original_name, error = %e, "point left out of template"),
            }
        }
        Self {
            name: name.into(),
            equipment_type,
            description: None,
            signatures,
        }
    }

    pub fn to_definition(&self) -> TemplateDefinition {
        TemplateDefinition {
            name: self.name.clone(),
            equipment_type: self.equipment_type,
            description: self.description.clone(),
            signatures: self
                .signatures
                .iter()
                .map(|s| SignatureDefinition {
                    id: s.id.clone(),
                    pattern: s.pattern.clone(),
                    required: s.is_required,
                    point_function: s.point_function,
                    object_type: s.object_type,
                    quantity: s.quantity,
                    units: s.units.clone(),
                })
                .collect(),
        }
    }

    pub fn signature(&self, id: &str) -> Option<&PointSignature> {
        self.signatures.iter().find(|s| s.id == id)
    }

    pub fn required(&self) -> impl Iterator<Item = &PointSignature> {
        self.signatures.iter().filter(|s| s.is_required)
    }
}

/// One template's report against a set of observed points.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTemplate<'a> {
    pub template: &'a Template,
    pub report: MatchReport<'a>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<EquipmentType, Vec<Template>>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TemplateDefinition>,
    ) -> Result<Self, LibraryError> {
        let mut library = Self::new();
        for def in definitions {
            library.insert(Template::from_definition(def)?)?;
        }
        Ok(library)
    }

    /// Parse `{"templates": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_str(json)?;
        Self::from_definitions(file.templates)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LibraryError> {
        let text = std::fs::read_to_string(path)?;
        let library = Self::from_json_str(&text)?;
        info!(path = %path.display(), templates = library.len(), "loaded template library");
        Ok(library)
    }

    pub fn to_json_string(&self) -> Result<String, LibraryError> {
        let file = LibraryFile {
            templates: self.iter().map(Template::to_definition).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Add a template. Names are unique across the library.
    pub fn insert(&mut self, template: Template) -> Result<(), LibraryError> {
        if self.get(&template.name).is_some() {
            return Err(LibraryError::DuplicateTemplate(template.name));
        }
        self.templates
            .entry(template.equipment_type)
            .or_default()
            .push(template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.iter().find(|t| t.name == name)
    }

    pub fn templates_for(&self, equipment_type: EquipmentType) -> &[Template] {
        self.templates
            .get(&equipment_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every template, by equipment type then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.templates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Match every template for an equipment type and order them best first:
    /// aggregate confidence, then required match rate, then name.
    pub fn rank<'a>(
        &'a self,
        equipment_type: EquipmentType,
        observed: &'a [NormalizedPoint],
        engine: &MatchEngine,
    ) -> Result<Vec<RankedTemplate<'a>>, SignatureError> {
        let mut ranked = self
            .templates_for(equipment_type)
            .iter()
            .map(|template| {
                engine
                    .match_template(&template.signatures, observed)
                    .map(|report| RankedTemplate { template, report })
            })
            .collect::<Result<Vec<_>, _>>()?;
        ranked.sort_by(|a, b| {
            b.report
                .aggregate_confidence
                .total_cmp(&a.report.aggregate_confidence)
                .then_with(|| b.report.required_match_rate.total_cmp(&a.report.required_match_rate))
                .then_with(|| a.template.name.cmp(&b.template.name))
        });
        Ok(ranked)
    }

    /// Apply accumulated statistics to a template's signatures. Returns the
    /// number of signatures updated, or `None` for an unknown template.
    pub fn absorb(&mut self, template_name: &str, stats: &MatchStatistics) -> Option<usize> {
        let template = self
            .templates
            .values_mut()
            .flatten()
            .find(|t| t.name == template_name)?;
        let updated = template
            .signatures
            .iter_mut()
            .filter_map(|sig| stats.apply_to(sig).then_some(()))
            .count();
        debug!(template = template_name, updated, "absorbed match statistics");
        Some(updated)
    }
}
