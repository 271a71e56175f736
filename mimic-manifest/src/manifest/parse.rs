//! Manifest parsing from files and strings.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    str::FromStr,
};

use indexmap::IndexMap;
use mimic_core::{EnumInfo, IntWidth};
use serde::Deserialize;

use super::{
    Manifest,
    validate::{ParseContext, find_quoted_span},
};
use crate::{
    Access, BindingDirective, ContractDescriptor, ContractMember, Error, ExtensionDirective,
    MemberKind, Param, Result, error::SourceContext,
};

const DEFAULT_FILENAME: &str = "contracts.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    contracts: IndexMap<String, RawContract>,
    #[serde(default)]
    enums: IndexMap<String, RawEnum>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContract {
    adapts: Option<String>,
    #[serde(default)]
    extends: Vec<String>,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    members: Vec<RawMember>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Property,
    Method,
    Indexer,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMember {
    kind: RawKind,
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    access: Option<Access>,
    #[serde(default)]
    params: Vec<RawParam>,
    returns: Option<String>,
    #[serde(default)]
    generics: Vec<String>,
    bind: Option<BindingDirective>,
    extension: Option<String>,
    returns_extension: Option<String>,
    adapt_as: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    extension: Option<ExtensionDirective>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnum {
    #[serde(default = "default_repr")]
    repr: String,
    #[serde(default)]
    variants: IndexMap<String, i64>,
}

fn default_repr() -> String {
    "i32".to_string()
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, DEFAULT_FILENAME)
    }
}

impl Manifest {
    /// Parse a contract manifest from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a manifest with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse and validate a manifest; `filename` is used for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let raw: RawManifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;

    let ctx = ParseContext::new(content, filename);
    let mut manifest = Manifest::new();

    for (name, raw_enum) in &raw.enums {
        let info = lower_enum(&ctx, name, raw_enum)?;
        manifest.enums.insert(name.clone(), info);
    }

    for (name, raw_contract) in &raw.contracts {
        ctx.validate_name(name, "contract")?;
        if manifest.enums.contains_key(name) {
            return Err(ctx.source_context().validation_error_at(
                format!("'{}' is declared as both a contract and an enum", name),
                ctx.find_span(name),
            ));
        }
        let contract = lower_contract(&ctx.push(name), name, raw_contract)?;
        manifest.contracts.insert(name.clone(), contract);
    }

    validate_references(&manifest, &ctx)?;
    Ok(manifest)
}

fn lower_enum<'a>(ctx: &ParseContext<'a>, name: &'a str, raw: &RawEnum) -> Result<EnumInfo> {
    ctx.validate_name(name, "enum")?;

    let repr = IntWidth::parse(&raw.repr).ok_or_else(|| {
        ctx.source_context().invalid_type_error(
            &raw.repr,
            ctx.context_for("enum repr"),
            "enum repr must be an integral type",
            ctx.find_value_span("repr", &raw.repr),
        )
    })?;

    let enum_ctx = ctx.push(name);
    let mut info = EnumInfo::new(name, repr);
    for (variant, value) in &raw.variants {
        enum_ctx.validate_name(variant, "variant")?;
        info = info.variant(variant.clone(), *value);
    }
    Ok(info)
}

fn lower_contract<'a>(
    ctx: &ParseContext<'a>,
    name: &str,
    raw: &'a RawContract,
) -> Result<ContractDescriptor> {
    for generic in &raw.generics {
        ctx.validate_name(generic, "generic parameter")?;
    }

    if let Some(adapts) = &raw.adapts {
        if adapts.trim().is_empty() {
            return Err(ctx.source_context().validation_error_at(
                format!("{} has a blank 'adapts' type", ctx.context_for("contract")),
                ctx.find_span(name),
            ));
        }
    }

    let mut contract = ContractDescriptor::new(name);
    contract.adapts = raw.adapts.clone();
    contract.extends = raw.extends.clone();
    contract.generics = raw.generics.clone();

    let mut seen = HashSet::new();
    for raw_member in &raw.members {
        let member = lower_member(ctx, &raw.generics, raw_member)?;
        let signature = member.signature();
        if !seen.insert(signature.clone()) {
            return Err(ctx.source_context().duplicate_member_error(
                name,
                signature,
                ctx.find_span(&member.name),
            ));
        }
        contract.members.push(member);
    }

    Ok(contract)
}

fn lower_member<'a>(
    ctx: &ParseContext<'a>,
    contract_generics: &[String],
    raw: &'a RawMember,
) -> Result<ContractMember> {
    let name = match (raw.kind, raw.name.as_deref()) {
        (RawKind::Indexer, None) => "Item",
        (_, Some(name)) => name,
        (_, None) => return Err(ctx.missing("name", "member")),
    };
    ctx.validate_name(name, "member")?;
    let member_ctx = ctx.push(name);

    let kind = match raw.kind {
        RawKind::Property => {
            if !raw.params.is_empty() || raw.returns.is_some() || !raw.generics.is_empty() {
                return Err(member_ctx.source_context().validation_error_at(
                    format!(
                        "{} cannot declare params, returns or generics",
                        member_ctx.context_for("property")
                    ),
                    ctx.find_span(name),
                ));
            }
            let ty = raw
                .ty
                .as_deref()
                .ok_or_else(|| member_ctx.missing("type", "property"))?;
            MemberKind::Property {
                ty: member_ctx.parse_type(ty, contract_generics, "type")?,
                access: raw.access.unwrap_or_default(),
            }
        }
        RawKind::Method => {
            if raw.ty.is_some() || raw.access.is_some() {
                return Err(member_ctx.source_context().validation_error_at(
                    format!(
                        "{} uses 'returns' for its result type and has no 'access'",
                        member_ctx.context_for("method")
                    ),
                    ctx.find_span(name),
                ));
            }
            for generic in &raw.generics {
                member_ctx.validate_name(generic, "generic parameter")?;
            }
            let generics: Vec<String> = contract_generics
                .iter()
                .chain(&raw.generics)
                .cloned()
                .collect();
            let returns = raw.returns.as_deref().unwrap_or("void");
            MemberKind::Method {
                params: lower_params(&member_ctx, &generics, &raw.params)?,
                returns: member_ctx.parse_type(returns, &generics, "returns")?,
                generics: raw.generics.clone(),
            }
        }
        RawKind::Indexer => {
            if raw.params.is_empty() {
                return Err(member_ctx.source_context().validation_error_at(
                    format!(
                        "{} must declare at least one parameter",
                        member_ctx.context_for("indexer")
                    ),
                    ctx.find_span(name),
                ));
            }
            let ty = raw
                .ty
                .as_deref()
                .ok_or_else(|| member_ctx.missing("type", "indexer"))?;
            MemberKind::Indexer {
                params: lower_params(&member_ctx, contract_generics, &raw.params)?,
                ty: member_ctx.parse_type(ty, contract_generics, "type")?,
                access: raw.access.unwrap_or_default(),
            }
        }
    };

    for hook in [&raw.extension, &raw.returns_extension].into_iter().flatten() {
        if hook.trim().is_empty() {
            return Err(member_ctx.source_context().validation_error_at(
                format!("{} names a blank hook", member_ctx.context_for("member")),
                ctx.find_span(name),
            ));
        }
    }

    Ok(ContractMember {
        name: name.to_string(),
        kind,
        binding: raw.bind.clone(),
        extension: raw.extension.clone(),
        return_extension: raw.returns_extension.clone(),
        adapt_as: raw.adapt_as.clone(),
    })
}

fn lower_params(
    ctx: &ParseContext<'_>,
    generics: &[String],
    raw: &[RawParam],
) -> Result<Vec<Param>> {
    let mut names = HashSet::new();
    raw.iter()
        .map(|param| {
            ctx.validate_name(&param.name, "parameter")?;
            if !names.insert(param.name.as_str()) {
                return Err(ctx.source_context().validation_error_at(
                    format!(
                        "{} '{}' is declared twice",
                        ctx.context_for("parameter"),
                        param.name
                    ),
                    ctx.find_span(&param.name),
                ));
            }
            Ok(Param {
                name: param.name.clone(),
                ty: ctx.parse_type(&param.ty, generics, "type")?,
                extension: param.extension.clone(),
            })
        })
        .collect()
}

/// Check cross-contract references once every contract is known.
fn validate_references(manifest: &Manifest, ctx: &ParseContext<'_>) -> Result<()> {
    let source = ctx.source_context();

    for contract in manifest.contracts.values() {
        for parent in &contract.extends {
            if !manifest.has_contract(parent) {
                return Err(source.unknown_contract_error(
                    parent,
                    format!("'extends' of '{}'", contract.name),
                    find_quoted_span(ctx.src(), parent),
                ));
            }
        }

        for member in &contract.members {
            if let Some(target) = &member.adapt_as {
                if !manifest.has_contract(target) {
                    return Err(source.unknown_contract_error(
                        target,
                        format!("'adapt_as' of '{}.{}'", contract.name, member.name),
                        ctx.find_value_span("adapt_as", target),
                    ));
                }
            }
        }
    }

    if let Some(cycle) = find_cycle(manifest) {
        let span = cycle.first().and_then(|name| ctx.find_span(name));
        return Err(source.inheritance_cycle_error(&cycle, span));
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Find an `extends` cycle, returned as the path that closes it.
fn find_cycle(manifest: &Manifest) -> Option<Vec<String>> {
    fn visit<'m>(
        manifest: &'m Manifest,
        name: &'m str,
        marks: &mut HashMap<&'m str, Mark>,
        stack: &mut Vec<&'m str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == name)?;
                let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(name, Mark::Visiting);
        stack.push(name);
        if let Some(contract) = manifest.contract(name) {
            for parent in &contract.extends {
                if let Some(cycle) = visit(manifest, parent, marks, stack) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    manifest
        .contracts
        .keys()
        .find_map(|name| visit(manifest, name, &mut marks, &mut stack))
}
