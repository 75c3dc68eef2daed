//! The subtype lattice.
//!
//! `TypeHierarchy` compiles a validated definition into per-type records
//! (direct and transitive relations, parameter substitution chains) plus
//! precomputed nearest-common-ancestor and nearest-common-descendant tables,
//! then answers subtyping and unification queries over parameterized type
//! references.
//!
//! Construction is a sequence of passes with real data dependencies:
//! typedefs, super edges, sub back-references, a fixed-point ancestor sweep
//! that composes parameter substitutions across super edges, the symmetric
//! descendant sweep, and finally the nearest-common tables in the style of
//! Czumaj, Kowaluk and Lingas, "Faster algorithms for finding lowest common
//! ancestors in directed acyclic graphs" (Theor. Comput. Sci. 380, 2007).
//! Preprocessing is O(n*m); name-level nearest-common queries are O(1).
//!
//! The hierarchy is immutable after construction. A definition that changes
//! is recompiled, not patched.

use crate::definition::{HierarchyDef, TypeSpec, Variance};
use crate::error::{HierarchyError, SolverError};
use indexmap::IndexMap;
use nomcheck_core::TypeStructure;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::debug;

/// A declared type parameter with its variance rule.
#[derive(Debug, Clone)]
struct ParamDef {
    name: String,
    variance: Variance,
}

/// A direct super edge: the supertype's name and this type's parameters
/// re-expressed in the supertype's parameter order. Substitution entries are
/// this type's own formal names or explicit types.
#[derive(Debug, Clone)]
struct SuperRef {
    name: String,
    substitution: Vec<TypeStructure>,
}

/// One declared nominal type. All names are canonical (lowercased).
#[derive(Debug)]
struct TypeDef {
    params: Vec<ParamDef>,
    supers: Vec<SuperRef>,
    subs: SmallVec<[String; 4]>,
    /// Transitively closed and reflexive.
    ancestors: FxHashSet<String>,
    /// Transitively closed and reflexive.
    descendants: FxHashSet<String>,
    /// Per ancestor: this type's parameters in the ancestor's order, as
    /// templates over this type's formal names.
    ancestor_params: FxHashMap<String, Vec<TypeStructure>>,
}

type NearestTable = FxHashMap<String, FxHashMap<String, Vec<String>>>;

/// Which of the two precomputed relations a query walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ancestors,
    Descendants,
}

impl Direction {
    fn flipped(self) -> Direction {
        match self {
            Direction::Ancestors => Direction::Descendants,
            Direction::Descendants => Direction::Ancestors,
        }
    }
}

/// The compiled subtype lattice.
#[derive(Debug)]
pub struct TypeHierarchy {
    types: IndexMap<String, TypeDef>,
    nearest_ancestors: NearestTable,
    nearest_descendants: NearestTable,
}

impl TypeHierarchy {
    /// Compiles a definition.
    ///
    /// Fails fast on the defects that would break preprocessing: undefined
    /// or malformed `fulfills` targets, super-parameter arity mismatches,
    /// invalid variance strings, and cyclic fulfillment chains. Run
    /// [`crate::validate_hierarchy`] first for a full report.
    pub fn new(def: &HierarchyDef) -> Result<Self, HierarchyError> {
        // Later declarations win caseless name collisions, as validation
        // reports them but does not prevent them.
        let mut specs: IndexMap<String, &TypeSpec> = IndexMap::new();
        for (name, spec) in def {
            specs.insert(name.to_lowercase(), spec);
        }

        let mut types = Self::init_types(&specs)?;
        Self::init_super_edges(&specs, &mut types)?;
        if let Some(path) = detect_cycle(&types) {
            return Err(HierarchyError::CyclicDefinition { path });
        }
        Self::init_sub_edges(&mut types);

        let super_order = resolution_order(&types, Direction::Ancestors);
        let sub_order = resolution_order(&types, Direction::Descendants);
        Self::init_ancestors(&mut types, &super_order);
        Self::init_descendants(&mut types, &sub_order);

        let nearest_ancestors = build_nearest_table(&types, &super_order, Direction::Ancestors);
        let nearest_descendants = build_nearest_table(&types, &sub_order, Direction::Descendants);

        debug!(
            types = types.len(),
            "compiled type hierarchy with nearest-common tables"
        );

        Ok(Self {
            types,
            nearest_ancestors,
            nearest_descendants,
        })
    }

    /// Pass 1: one `TypeDef` per declared name, params registered with
    /// their variance.
    fn init_types(
        specs: &IndexMap<String, &TypeSpec>,
    ) -> Result<IndexMap<String, TypeDef>, HierarchyError> {
        let mut types = IndexMap::new();
        for (name, spec) in specs {
            let mut params = Vec::with_capacity(spec.params.len());
            for p in &spec.params {
                let variance =
                    Variance::from_str(&p.variance).map_err(|error| HierarchyError::Variance {
                        type_name: name.clone(),
                        param: p.name.clone(),
                        error,
                    })?;
                params.push(ParamDef {
                    name: p.name.to_lowercase(),
                    variance,
                });
            }
            types.insert(
                name.clone(),
                TypeDef {
                    params,
                    supers: Vec::new(),
                    subs: SmallVec::new(),
                    ancestors: FxHashSet::default(),
                    descendants: FxHashSet::default(),
                    ancestor_params: FxHashMap::default(),
                },
            );
        }
        Ok(types)
    }

    /// Pass 2: resolve `fulfills` entries into super edges with parameter
    /// substitutions.
    fn init_super_edges(
        specs: &IndexMap<String, &TypeSpec>,
        types: &mut IndexMap<String, TypeDef>,
    ) -> Result<(), HierarchyError> {
        let mut edges: Vec<(String, SuperRef)> = Vec::new();
        for (name, spec) in specs {
            for fulfills in &spec.fulfills {
                let parsed = nomcheck_core::type_structure::parse(fulfills).map_err(|error| {
                    HierarchyError::MalformedSuperReference {
                        type_name: name.clone(),
                        error,
                    }
                })?;
                let sup = types
                    .get(&parsed.name)
                    .ok_or_else(|| HierarchyError::UndefinedSupertype {
                        type_name: name.clone(),
                        super_name: parsed.name.clone(),
                    })?;
                if parsed.params.len() != sup.params.len() {
                    return Err(HierarchyError::SuperParamsCount {
                        type_name: name.clone(),
                        super_name: parsed.name.clone(),
                        expected: sup.params.len(),
                        actual: parsed.params.len(),
                    });
                }
                edges.push((
                    name.clone(),
                    SuperRef {
                        name: parsed.name,
                        substitution: parsed.params,
                    },
                ));
            }
        }
        for (sub, edge) in edges {
            registered(types.get_mut(&sub)).supers.push(edge);
        }
        Ok(())
    }

    /// Pass 3: sub back-references, the inverse of the super edges.
    fn init_sub_edges(types: &mut IndexMap<String, TypeDef>) {
        let mut inverse: Vec<(String, String)> = Vec::new();
        for (name, def) in types.iter() {
            for sup in &def.supers {
                inverse.push((sup.name.clone(), name.clone()));
            }
        }
        for (sup, sub) in inverse {
            registered(types.get_mut(&sup)).subs.push(sub);
        }
    }

    /// Pass 4: ancestors and ancestor-param substitution chains, swept in
    /// supers-first order so every super is resolved before its subs.
    fn init_ancestors(types: &mut IndexMap<String, TypeDef>, super_order: &[String]) {
        for name in super_order {
            let def = &types[name.as_str()];
            let mut ancestors: FxHashSet<String> = FxHashSet::default();
            ancestors.insert(name.clone());
            let mut ancestor_params: FxHashMap<String, Vec<TypeStructure>> = FxHashMap::default();
            let own_formals: Vec<TypeStructure> = def
                .params
                .iter()
                .map(|p| TypeStructure::new(&p.name))
                .collect();
            ancestor_params.insert(name.clone(), own_formals);

            let supers = def.supers.clone();
            for edge in &supers {
                let sup_def = &types[edge.name.as_str()];
                let sup_formals = &sup_def.params;
                for anc in &sup_def.ancestors {
                    ancestors.insert(anc.clone());
                }
                for (anc, template) in &sup_def.ancestor_params {
                    // Compose the super's template with this type's
                    // substitution for the super's formals.
                    let composed: Vec<TypeStructure> = template
                        .iter()
                        .map(|t| substitute_named(t, sup_formals, &edge.substitution))
                        .collect();
                    ancestor_params.entry(anc.clone()).or_insert(composed);
                }
            }

            let def = registered(types.get_mut(name));
            def.ancestors = ancestors;
            def.ancestor_params = ancestor_params;
        }
    }

    /// Pass 5: descendants, symmetric to pass 4 via the sub edges.
    fn init_descendants(types: &mut IndexMap<String, TypeDef>, sub_order: &[String]) {
        for name in sub_order {
            let def = &types[name.as_str()];
            let mut descendants: FxHashSet<String> = FxHashSet::default();
            descendants.insert(name.clone());
            for sub in def.subs.clone() {
                for d in &types[sub.as_str()].descendants {
                    descendants.insert(d.clone());
                }
            }
            registered(types.get_mut(name)).descendants = descendants;
        }
    }

    /// Returns true if the given name is declared in the hierarchy.
    pub fn type_exists(&self, name: &str) -> bool {
        self.types.contains_key(&name.to_lowercase())
    }

    /// Returns true if the two references are exactly the same type:
    /// caseless name equality plus recursive parameter equality. Arity is
    /// checked against the declarations.
    pub fn type_is_exactly_type(
        &self,
        a: &TypeStructure,
        b: &TypeStructure,
    ) -> Result<bool, SolverError> {
        let a = a.to_caseless();
        let b = b.to_caseless();
        self.check_type(&a)?;
        self.check_type(&b)?;
        Ok(a == b)
    }

    /// Returns true if `sub` fulfills `sup`, directly or transitively,
    /// with each of `sup`'s parameters related according to its declared
    /// variance.
    pub fn type_fulfills_type(
        &self,
        sub: &TypeStructure,
        sup: &TypeStructure,
    ) -> Result<bool, SolverError> {
        let sub = sub.to_caseless();
        let sup = sup.to_caseless();
        self.check_type(&sub)?;
        self.check_type(&sup)?;
        self.fulfills_inner(&sub, &sup)
    }

    /// Re-expresses `t`'s actual parameters in `ancestor`'s parameter
    /// order. `None` if `ancestor` is not an ancestor of `t`.
    pub fn params_for_ancestor(
        &self,
        t: &TypeStructure,
        ancestor: &str,
    ) -> Result<Option<Vec<TypeStructure>>, SolverError> {
        let t = t.to_caseless();
        let ancestor = ancestor.to_lowercase();
        self.check_type(&t)?;
        if !self.types.contains_key(&ancestor) {
            return Err(SolverError::TypeNotFound { name: ancestor });
        }
        Ok(self.substituted_ancestor_params(&t, &ancestor))
    }

    /// Maps an ancestor reference's actual parameters down into a
    /// descendant's parameter slots. Slots the ancestor does not constrain
    /// are `None`; if the ancestor's actuals are incompatible with the
    /// descendant's declared fulfillment the whole mapping is `None`.
    pub fn params_for_descendant(
        &self,
        ancestor: &TypeStructure,
        descendant: &str,
    ) -> Result<Option<Vec<Option<TypeStructure>>>, SolverError> {
        let ancestor = ancestor.to_caseless();
        let descendant = descendant.to_lowercase();
        self.check_type(&ancestor)?;
        if !self.types.contains_key(&descendant) {
            return Err(SolverError::TypeNotFound { name: descendant });
        }
        self.descendant_slots(&ancestor, &descendant)
    }

    /// The nearest common ancestors of the given types: every minimal
    /// parameterized supertype of all of them. Empty input yields an empty
    /// result; a single input yields itself.
    pub fn nearest_common_parents(
        &self,
        types: &[TypeStructure],
    ) -> Result<Vec<TypeStructure>, SolverError> {
        self.nearest_common(types, Direction::Ancestors)
    }

    /// The nearest common descendants of the given types: every minimal
    /// parameterized subtype of all of them.
    pub fn nearest_common_descendants(
        &self,
        types: &[TypeStructure],
    ) -> Result<Vec<TypeStructure>, SolverError> {
        self.nearest_common(types, Direction::Descendants)
    }

    fn nearest_common(
        &self,
        types: &[TypeStructure],
        dir: Direction,
    ) -> Result<Vec<TypeStructure>, SolverError> {
        let mut canonical = Vec::with_capacity(types.len());
        for t in types {
            let t = t.to_caseless();
            self.check_type(&t)?;
            canonical.push(t);
        }
        let Some(first) = canonical.first() else {
            return Ok(Vec::new());
        };
        let mut acc = vec![first.clone()];
        for next in &canonical[1..] {
            let mut merged = Vec::new();
            for current in &acc {
                for candidate in self.nearest_common_pair(current, next, dir)? {
                    if !merged.contains(&candidate) {
                        merged.push(candidate);
                    }
                }
            }
            acc = self.minimize(merged, dir)?;
            if acc.is_empty() {
                break;
            }
        }
        Ok(acc)
    }

    /// Nearest common relatives of a pair, parameters included.
    ///
    /// Starts from the precomputed name-level table and unifies each
    /// candidate's parameter slots. A candidate whose parameters fail to
    /// unify is replaced by its direct relatives (supers when walking
    /// ancestors, subs when walking descendants), so a less constrained
    /// relative further out can still produce a result.
    fn nearest_common_pair(
        &self,
        a: &TypeStructure,
        b: &TypeStructure,
        dir: Direction,
    ) -> Result<Vec<TypeStructure>, SolverError> {
        if a == b {
            return Ok(vec![a.clone()]);
        }
        if a.is_generic() || b.is_generic() {
            return Ok(Vec::new());
        }

        let table = match dir {
            Direction::Ancestors => &self.nearest_ancestors,
            Direction::Descendants => &self.nearest_descendants,
        };
        let mut queue: VecDeque<String> = table
            .get(&a.name)
            .and_then(|row| row.get(&b.name))
            .cloned()
            .unwrap_or_default()
            .into();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut results: Vec<TypeStructure> = Vec::new();

        while let Some(outer) = queue.pop_front() {
            if !seen.insert(outer.clone()) {
                continue;
            }
            match self.unify_outer(&outer, a, b, dir)? {
                Some(unified) => {
                    for u in unified {
                        if !results.contains(&u) {
                            results.push(u);
                        }
                    }
                }
                None => {
                    let def = &self.types[outer.as_str()];
                    match dir {
                        Direction::Ancestors => {
                            queue.extend(def.supers.iter().map(|s| s.name.clone()));
                        }
                        Direction::Descendants => {
                            queue.extend(def.subs.iter().cloned());
                        }
                    }
                }
            }
        }
        self.minimize(results, dir)
    }

    /// Attempts to express both inputs as parameterizations of `outer`,
    /// unifying each parameter slot according to `outer`'s declared
    /// variance. `None` means some slot failed to unify.
    fn unify_outer(
        &self,
        outer: &str,
        a: &TypeStructure,
        b: &TypeStructure,
        dir: Direction,
    ) -> Result<Option<Vec<TypeStructure>>, SolverError> {
        let outer_def = &self.types[outer];
        let arity = outer_def.params.len();

        // Per slot, the actual values each input contributes.
        let mut slot_values: Vec<Vec<TypeStructure>> = vec![Vec::new(); arity];
        match dir {
            Direction::Ancestors => {
                for input in [a, b] {
                    let Some(mapped) = self.substituted_ancestor_params(input, outer) else {
                        return Ok(None);
                    };
                    for (slot, value) in slot_values.iter_mut().zip(mapped) {
                        slot.push(value);
                    }
                }
            }
            Direction::Descendants => {
                for input in [a, b] {
                    let Some(slots) = self.descendant_slots(input, outer)? else {
                        return Ok(None);
                    };
                    for (slot, value) in slot_values.iter_mut().zip(slots) {
                        if let Some(value) = value {
                            slot.push(value);
                        }
                    }
                }
            }
        }

        let mut per_slot: Vec<Vec<TypeStructure>> = Vec::with_capacity(arity);
        for (i, pd) in outer_def.params.iter().enumerate() {
            let values = &slot_values[i];
            let candidates = match values.len() {
                // A slot no input constrains stays the formal generic.
                0 => vec![TypeStructure::new(&pd.name)],
                1 => vec![values[0].clone()],
                _ => match pd.variance {
                    Variance::Covariant => self.nearest_common_pair(&values[0], &values[1], dir)?,
                    Variance::Contravariant => {
                        self.nearest_common_pair(&values[0], &values[1], dir.flipped())?
                    }
                    Variance::Invariant => {
                        if values[0] == values[1] {
                            vec![values[0].clone()]
                        } else {
                            Vec::new()
                        }
                    }
                },
            };
            if candidates.is_empty() {
                return Ok(None);
            }
            per_slot.push(candidates);
        }

        Ok(Some(cartesian(outer, &per_slot)))
    }

    /// Drops every candidate that is a strict relative of another, keeping
    /// only incomparable results, plus structural duplicates.
    fn minimize(
        &self,
        candidates: Vec<TypeStructure>,
        dir: Direction,
    ) -> Result<Vec<TypeStructure>, SolverError> {
        let mut kept = Vec::with_capacity(candidates.len());
        'outer: for (i, c) in candidates.iter().enumerate() {
            for (j, other) in candidates.iter().enumerate() {
                if i == j || c == other {
                    continue;
                }
                let farther = match dir {
                    // An ancestor of another candidate is not nearest.
                    Direction::Ancestors => self.fulfills_inner(other, c)?,
                    // A descendant of another candidate is not nearest.
                    Direction::Descendants => self.fulfills_inner(c, other)?,
                };
                if farther {
                    continue 'outer;
                }
            }
            kept.push(c.clone());
        }
        Ok(kept)
    }

    fn fulfills_inner(
        &self,
        sub: &TypeStructure,
        sup: &TypeStructure,
    ) -> Result<bool, SolverError> {
        // Generic placeholders only fulfill themselves.
        if sub.is_generic() || sup.is_generic() {
            return Ok(sub == sup);
        }
        let sub_def = self
            .types
            .get(&sub.name)
            .ok_or_else(|| SolverError::TypeNotFound {
                name: sub.name.clone(),
            })?;
        if !sub_def.ancestors.contains(&sup.name) {
            return Ok(false);
        }
        let Some(mapped) = self.substituted_ancestor_params(sub, &sup.name) else {
            return Ok(false);
        };
        let sup_def = &self.types[sup.name.as_str()];
        for (i, pd) in sup_def.params.iter().enumerate() {
            let holds = match pd.variance {
                Variance::Covariant => self.fulfills_inner(&mapped[i], &sup.params[i])?,
                Variance::Contravariant => self.fulfills_inner(&sup.params[i], &mapped[i])?,
                Variance::Invariant => mapped[i] == sup.params[i],
            };
            if !holds {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `t`'s actual parameters re-expressed in `ancestor`'s order, by
    /// substituting the actuals into the precomputed template.
    fn substituted_ancestor_params(
        &self,
        t: &TypeStructure,
        ancestor: &str,
    ) -> Option<Vec<TypeStructure>> {
        let def = self.types.get(&t.name)?;
        let template = def.ancestor_params.get(ancestor)?;
        Some(
            template
                .iter()
                .map(|tm| substitute_named(tm, &def.params, &t.params))
                .collect(),
        )
    }

    /// Inverts the descendant's fulfillment template against an ancestor
    /// reference's actual parameters.
    fn descendant_slots(
        &self,
        ancestor: &TypeStructure,
        descendant: &str,
    ) -> Result<Option<Vec<Option<TypeStructure>>>, SolverError> {
        let desc_def = &self.types[descendant];
        let Some(template) = desc_def.ancestor_params.get(&ancestor.name) else {
            return Ok(None);
        };
        let anc_def = &self.types[ancestor.name.as_str()];
        let mut slots: Vec<Option<TypeStructure>> = vec![None; desc_def.params.len()];
        for (i, tmpl) in template.iter().enumerate() {
            let variance = anc_def.params[i].variance;
            if !self.bind_descendant_slot(tmpl, &ancestor.params[i], variance, desc_def, &mut slots)? {
                return Ok(None);
            }
        }
        Ok(Some(slots))
    }

    /// Matches one template entry against one actual, filling descendant
    /// parameter slots. A formal that appears in several slots must receive
    /// structurally equal actuals.
    fn bind_descendant_slot(
        &self,
        tmpl: &TypeStructure,
        actual: &TypeStructure,
        variance: Variance,
        desc_def: &TypeDef,
        slots: &mut [Option<TypeStructure>],
    ) -> Result<bool, SolverError> {
        if tmpl.is_generic() {
            let Some(idx) = desc_def.params.iter().position(|p| p.name == tmpl.name) else {
                return Ok(tmpl == actual);
            };
            return Ok(match &slots[idx] {
                None => {
                    slots[idx] = Some(actual.clone());
                    true
                }
                Some(existing) => existing == actual,
            });
        }
        if actual.is_generic() {
            return Ok(false);
        }
        if tmpl.name == actual.name {
            let Some(inner_def) = self.types.get(&tmpl.name) else {
                return Ok(tmpl == actual);
            };
            if tmpl.params.len() != actual.params.len()
                || tmpl.params.len() != inner_def.params.len()
            {
                return Ok(false);
            }
            for (i, pd) in inner_def.params.iter().enumerate() {
                if !self.bind_descendant_slot(
                    &tmpl.params[i],
                    &actual.params[i],
                    pd.variance,
                    desc_def,
                    slots,
                )? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        // Differing names: only a fully explicit template can be related to
        // the actual; one containing formals has nothing to extract them
        // from.
        if contains_generic(tmpl) {
            return Ok(false);
        }
        match variance {
            Variance::Covariant => self.fulfills_inner(tmpl, actual),
            Variance::Contravariant => self.fulfills_inner(actual, tmpl),
            Variance::Invariant => Ok(tmpl == actual),
        }
    }

    /// Validates a reference against the declarations: every explicit name
    /// must exist and carry exactly its declared number of parameters.
    fn check_type(&self, t: &TypeStructure) -> Result<(), SolverError> {
        if !t.is_generic() {
            let def = self
                .types
                .get(&t.name)
                .ok_or_else(|| SolverError::TypeNotFound {
                    name: t.name.clone(),
                })?;
            if t.params.len() != def.params.len() {
                return Err(SolverError::ActualParamsCount {
                    type_name: t.name.clone(),
                    expected: def.params.len(),
                    actual: t.params.len(),
                });
            }
        }
        for p in &t.params {
            self.check_type(p)?;
        }
        Ok(())
    }
}

/// Replaces formal-parameter placeholders in a template with the matching
/// actuals.
fn substitute_named(
    template: &TypeStructure,
    formals: &[ParamDef],
    args: &[TypeStructure],
) -> TypeStructure {
    if template.params.is_empty() {
        if let Some(i) = formals.iter().position(|p| p.name == template.name) {
            return args[i].clone();
        }
    }
    TypeStructure::with_params(
        template.name.clone(),
        template
            .params
            .iter()
            .map(|p| substitute_named(p, formals, args))
            .collect(),
    )
}

fn contains_generic(t: &TypeStructure) -> bool {
    t.is_generic() || t.params.iter().any(contains_generic)
}

/// Builds every combination of per-slot candidates into full references.
fn cartesian(outer: &str, per_slot: &[Vec<TypeStructure>]) -> Vec<TypeStructure> {
    let mut combos: Vec<Vec<TypeStructure>> = vec![Vec::new()];
    for slot in per_slot {
        let mut next = Vec::with_capacity(combos.len() * slot.len());
        for combo in &combos {
            for candidate in slot {
                let mut extended = combo.clone();
                extended.push(candidate.clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
        .into_iter()
        .map(|params| TypeStructure::with_params(outer, params))
        .collect()
}

/// Orders types so that every relevant relative (supers for the ancestor
/// direction, subs for the descendant direction) precedes the type itself.
/// This is the fixed-point sweep of construction: repeatedly admit types
/// whose relatives are all resolved. Acyclicity is checked beforehand, so
/// the sweep always terminates.
fn resolution_order(types: &IndexMap<String, TypeDef>, dir: Direction) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(types.len());
    let mut resolved: FxHashSet<String> = FxHashSet::default();
    while order.len() < types.len() {
        let mut progressed = false;
        for (name, def) in types {
            if resolved.contains(name) {
                continue;
            }
            let ready = match dir {
                Direction::Ancestors => def.supers.iter().all(|s| resolved.contains(&s.name)),
                Direction::Descendants => def.subs.iter().all(|s| resolved.contains(s)),
            };
            if ready {
                resolved.insert(name.clone());
                order.push(name.clone());
                progressed = true;
            }
        }
        if !progressed {
            // Unreachable: the graph was checked for cycles.
            break;
        }
    }
    order
}

/// Nearest-common preprocessing: in relative-first order, a type covers the
/// pair outright when the other type is already in its closure; otherwise
/// the answer is the union of its relatives' answers, minimized.
fn build_nearest_table(
    types: &IndexMap<String, TypeDef>,
    order: &[String],
    dir: Direction,
) -> NearestTable {
    let mut table: NearestTable = FxHashMap::default();
    for x in order {
        let xdef = &types[x.as_str()];
        let mut row: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for y in types.keys() {
            let covers = match dir {
                Direction::Ancestors => xdef.descendants.contains(y),
                Direction::Descendants => xdef.ancestors.contains(y),
            };
            let entry = if covers {
                vec![x.clone()]
            } else {
                let mut merged: Vec<String> = Vec::new();
                let relatives: Vec<&String> = match dir {
                    Direction::Ancestors => xdef.supers.iter().map(|s| &s.name).collect(),
                    Direction::Descendants => xdef.subs.iter().collect(),
                };
                for r in relatives {
                    if let Some(names) = table.get(r).and_then(|row| row.get(y)) {
                        for n in names {
                            if !merged.contains(n) {
                                merged.push(n.clone());
                            }
                        }
                    }
                }
                minimize_names(types, merged, dir)
            };
            row.insert(y.clone(), entry);
        }
        table.insert(x.clone(), row);
    }
    table
}

/// Keeps only incomparable names: no survivor is a strict relative of
/// another survivor.
fn minimize_names(
    types: &IndexMap<String, TypeDef>,
    names: Vec<String>,
    dir: Direction,
) -> Vec<String> {
    names
        .iter()
        .filter(|m| {
            !names.iter().any(|o| {
                o != *m
                    && match dir {
                        Direction::Ancestors => types[o.as_str()].ancestors.contains(*m),
                        Direction::Descendants => types[o.as_str()].descendants.contains(*m),
                    }
            })
        })
        .cloned()
        .collect()
}

/// Depth-first cycle search over the super edges. Returns the cycle path
/// from the first repeated type back to itself.
fn detect_cycle(types: &IndexMap<String, TypeDef>) -> Option<Vec<String>> {
    fn dfs(
        name: &str,
        types: &IndexMap<String, TypeDef>,
        done: &mut FxHashSet<String>,
        on_stack: &mut FxHashSet<String>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        if on_stack.contains(name) {
            let start = path.iter().position(|p| p == name)?;
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        if done.contains(name) {
            return None;
        }
        on_stack.insert(name.to_string());
        path.push(name.to_string());
        for sup in &types[name].supers {
            if let Some(cycle) = dfs(&sup.name, types, done, on_stack, path) {
                return Some(cycle);
            }
        }
        on_stack.remove(name);
        path.pop();
        done.insert(name.to_string());
        None
    }

    let mut done = FxHashSet::default();
    for name in types.keys() {
        if done.contains(name) {
            continue;
        }
        let mut on_stack = FxHashSet::default();
        let mut path = Vec::new();
        if let Some(cycle) = dfs(name, types, &mut done, &mut on_stack, &mut path) {
            return Some(cycle);
        }
    }
    None
}

/// Internal-invariant lookup: the name was inserted by an earlier pass.
fn registered<T>(opt: Option<T>) -> T {
    match opt {
        Some(v) => v,
        None => unreachable!("type registered in pass 1"),
    }
}

#[cfg(test)]
#[path = "tests/hierarchy_tests.rs"]
mod tests;
