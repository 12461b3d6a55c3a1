//! Arena storage for one kind of agent, with breeds and default tables.
//!
//! An [`AgentSet`] owns every record of its kind, keyed by [`AgentId`].
//! Ids come from a single counter, so they strictly increase in creation
//! order and are never reused. Base membership is kept as an id-sorted
//! [`AgentArray`]; each breed keeps its own sorted membership, so breed
//! membership is a tag on the record plus an index, never a copy.
//!
//! Field lookup goes per-agent override, then breed default, then base
//! default.

use herd_core::{AgentId, BreedId};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::agent_array::AgentArray;
use crate::error::AgentError;
use crate::value::{Value, Vars};

static EMPTY: AgentArray<AgentId> = AgentArray::new();

fn by_id(id: &AgentId) -> AgentId {
    *id
}

// ── Scope ───────────────────────────────────────────────────────

/// Which view of an agent set an operation applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every agent of the kind.
    #[default]
    Base,
    /// Only members of one breed.
    Breed(BreedId),
}

impl From<BreedId> for Scope {
    fn from(b: BreedId) -> Self {
        Self::Breed(b)
    }
}

// ── Records and breeds ──────────────────────────────────────────

/// One live agent.
#[derive(Clone, Debug)]
pub struct AgentRecord<S> {
    id: AgentId,
    breed: Option<BreedId>,
    vars: Vars,
    /// Kind-specific state (position, heading, link ends, ...).
    pub state: S,
}

impl<S> AgentRecord<S> {
    /// The agent's id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The breed the agent belongs to, if any.
    pub fn breed(&self) -> Option<BreedId> {
        self.breed
    }

    /// Per-agent field overrides.
    pub fn vars(&self) -> &Vars {
        &self.vars
    }
}

/// A named sub-population of an agent set.
#[derive(Clone, Debug, Default)]
pub struct Breed {
    name: String,
    members: AgentArray<AgentId>,
    defaults: Vars,
    own_variables: Vec<String>,
}

impl Breed {
    /// Breed name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member ids, ascending.
    pub fn members(&self) -> &AgentArray<AgentId> {
        &self.members
    }

    /// Breed-level default values.
    pub fn defaults(&self) -> &Vars {
        &self.defaults
    }

    /// Fields declared for this breed only.
    pub fn own_variables(&self) -> &[String] {
        &self.own_variables
    }
}

// ── AgentSet ────────────────────────────────────────────────────

/// All agents of one kind.
#[derive(Clone, Debug)]
pub struct AgentSet<S> {
    name: String,
    next_id: u32,
    store: IndexMap<AgentId, AgentRecord<S>>,
    members: AgentArray<AgentId>,
    defaults: Vars,
    own_variables: Vec<String>,
    breeds: IndexMap<String, Breed>,
    fixed: bool,
}

impl<S> AgentSet<S> {
    /// An empty set named `name` (used in errors and logs).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: 0,
            store: IndexMap::new(),
            members: AgentArray::new(),
            defaults: Vars::new(),
            own_variables: Vec::new(),
            breeds: IndexMap::new(),
            fixed: false,
        }
    }

    /// An empty set whose base population never changes once filled.
    ///
    /// Base-scope asks over a fixed set use the plain indexed loop.
    pub fn new_fixed(name: impl Into<String>) -> Self {
        Self {
            fixed: true,
            ..Self::new(name)
        }
    }

    /// Set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the base population is fixed.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    // ── breeds ──────────────────────────────────────────────────

    /// Register a breed, returning its id. Re-registering a name returns
    /// the existing id.
    pub fn new_breed(&mut self, name: &str) -> BreedId {
        if let Some(index) = self.breeds.get_index_of(name) {
            return BreedId(index as u16);
        }
        let id = BreedId(self.breeds.len() as u16);
        self.breeds.insert(
            name.to_owned(),
            Breed {
                name: name.to_owned(),
                ..Breed::default()
            },
        );
        debug!(set = %self.name, breed = name, %id, "breed created");
        id
    }

    /// Id of the breed called `name`.
    pub fn breed_id(&self, name: &str) -> Option<BreedId> {
        self.breeds.get_index_of(name).map(|i| BreedId(i as u16))
    }

    /// Name of breed `id`.
    pub fn breed_name(&self, id: BreedId) -> Option<&str> {
        self.breed(id).map(Breed::name)
    }

    /// Breed `id`.
    pub fn breed(&self, id: BreedId) -> Option<&Breed> {
        self.breeds.get_index(id.index()).map(|(_, b)| b)
    }

    /// All breeds in registration order.
    pub fn breeds(&self) -> impl Iterator<Item = (BreedId, &Breed)> {
        self.breeds
            .values()
            .enumerate()
            .map(|(i, b)| (BreedId(i as u16), b))
    }

    fn breed_mut(&mut self, id: BreedId) -> Result<&mut Breed, AgentError> {
        let set = &self.name;
        self.breeds
            .get_index_mut(id.index())
            .map(|(_, b)| b)
            .ok_or_else(|| AgentError::UnknownBreed {
                set: set.clone(),
                breed: id,
            })
    }

    /// Fail unless `scope` names the base set or a registered breed.
    pub fn check_scope(&self, scope: Scope) -> Result<(), AgentError> {
        match scope {
            Scope::Breed(b) if self.breed(b).is_none() => Err(AgentError::UnknownBreed {
                set: self.name.clone(),
                breed: b,
            }),
            _ => Ok(()),
        }
    }

    // ── membership ──────────────────────────────────────────────

    /// Member ids of `scope`, ascending. Unknown breeds are empty.
    pub fn members(&self, scope: Scope) -> &AgentArray<AgentId> {
        match scope {
            Scope::Base => &self.members,
            Scope::Breed(b) => self.breed(b).map(Breed::members).unwrap_or(&EMPTY),
        }
    }

    /// Number of members of `scope`.
    pub fn len(&self, scope: Scope) -> usize {
        self.members(scope).len()
    }

    /// Whether `scope` has no members.
    pub fn is_empty(&self, scope: Scope) -> bool {
        self.members(scope).is_empty()
    }

    /// Whether `id` is a live member of `scope`.
    pub fn contains(&self, scope: Scope, id: AgentId) -> bool {
        match scope {
            Scope::Base => self.is_live(id),
            Scope::Breed(b) => self.breed_of(id) == Some(b),
        }
    }

    /// Whether an agent with this id exists.
    pub fn is_live(&self, id: AgentId) -> bool {
        self.store.contains_key(&id)
    }

    /// Record for `id`.
    pub fn get(&self, id: AgentId) -> Option<&AgentRecord<S>> {
        self.store.get(&id)
    }

    /// Mutable record for `id`.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentRecord<S>> {
        self.store.get_mut(&id)
    }

    /// Kind-specific state of `id`.
    pub fn state(&self, id: AgentId) -> Option<&S> {
        self.store.get(&id).map(|r| &r.state)
    }

    /// Mutable kind-specific state of `id`.
    pub fn state_mut(&mut self, id: AgentId) -> Option<&mut S> {
        self.store.get_mut(&id).map(|r| &mut r.state)
    }

    /// Like [`AgentSet::get`] but failing with [`AgentError::UnknownAgent`].
    pub fn require(&self, id: AgentId) -> Result<&AgentRecord<S>, AgentError> {
        self.store.get(&id).ok_or_else(|| self.unknown(id))
    }

    /// Like [`AgentSet::get_mut`] but failing with [`AgentError::UnknownAgent`].
    pub fn require_mut(&mut self, id: AgentId) -> Result<&mut AgentRecord<S>, AgentError> {
        let set = &self.name;
        self.store
            .get_mut(&id)
            .ok_or_else(|| AgentError::UnknownAgent {
                set: set.clone(),
                id,
            })
    }

    fn unknown(&self, id: AgentId) -> AgentError {
        AgentError::UnknownAgent {
            set: self.name.clone(),
            id,
        }
    }

    /// Breed of `id`, if it is live and bred.
    pub fn breed_of(&self, id: AgentId) -> Option<BreedId> {
        self.store.get(&id).and_then(|r| r.breed)
    }

    /// The ids in `ids` that belong to `breed`.
    pub fn with_breed(&self, ids: &[AgentId], breed: BreedId) -> AgentArray<AgentId> {
        ids.iter()
            .copied()
            .filter(|&id| self.breed_of(id) == Some(breed))
            .collect()
    }

    /// Keep only the ids in `ids` that are members of `scope`.
    pub fn filter_scope(&self, ids: AgentArray<AgentId>, scope: Scope) -> AgentArray<AgentId> {
        match scope {
            Scope::Base => ids,
            Scope::Breed(b) => self.with_breed(&ids, b),
        }
    }

    // ── lifecycle ───────────────────────────────────────────────

    /// Create an agent in `scope` with the given state.
    ///
    /// The id comes from the base counter, so it is larger than every id
    /// issued before it, in any breed.
    pub fn add_agent(&mut self, scope: Scope, state: S) -> Result<AgentId, AgentError> {
        self.check_scope(scope)?;
        let next = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| AgentError::IdsExhausted {
                set: self.name.clone(),
            })?;
        let id = AgentId(self.next_id);
        self.next_id = next;
        let breed = match scope {
            Scope::Base => None,
            Scope::Breed(b) => Some(b),
        };
        self.store.insert(
            id,
            AgentRecord {
                id,
                breed,
                vars: Vars::new(),
                state,
            },
        );
        self.members.push(id);
        if let Some(b) = breed {
            self.breed_mut(b)?.members.push(id);
        }
        Ok(id)
    }

    /// Remove `id` from the set and its breed, returning its record.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<AgentRecord<S>> {
        let Some(record) = self.store.swap_remove(&id) else {
            warn!(set = %self.name, %id, "remove_agent: no such agent");
            return None;
        };
        if let Some(b) = record.breed {
            if let Some((_, breed)) = self.breeds.get_index_mut(b.index()) {
                breed.members.remove_item(&id, by_id);
            }
        }
        self.members.remove_item(&id, by_id);
        Some(record)
    }

    /// Remove every member of `scope`, returning the removed records in
    /// id order.
    pub fn clear(&mut self, scope: Scope) -> Vec<AgentRecord<S>> {
        let ids = self.members(scope).to_vec();
        ids.into_iter()
            .filter_map(|id| self.remove_agent(id))
            .collect()
    }

    /// Move `id` into `target` (a breed, or `None` for the bare base set).
    ///
    /// Fields declared only by the old breed are dropped; fields declared
    /// by the new one and not yet set become 0 unless a default covers
    /// them.
    pub fn set_breed(&mut self, id: AgentId, target: Option<BreedId>) -> Result<(), AgentError> {
        if let Some(b) = target {
            self.check_scope(Scope::Breed(b))?;
        }
        let old = self.require(id)?.breed;
        if old == target {
            return Ok(());
        }
        let old_scope = old.map_or(Scope::Base, Scope::Breed);
        let new_scope = target.map_or(Scope::Base, Scope::Breed);
        let old_vars = self.own_variables(old_scope);
        let new_vars = self.own_variables(new_scope);

        if let Some(b) = old {
            self.breed_mut(b)?.members.remove_item(&id, by_id);
        }
        if let Some(b) = target {
            self.breed_mut(b)?.members.insert_sorted(id, by_id)?;
        }

        let fill: Vec<String> = new_vars
            .iter()
            .filter(|v| self.get_default(new_scope, v).is_none())
            .cloned()
            .collect();
        let record = self.require_mut(id)?;
        for v in old_vars.iter().filter(|v| !new_vars.contains(v)) {
            record.vars.shift_remove(v);
        }
        for v in fill {
            record.vars.entry(v).or_insert(Value::Number(0.0));
        }
        record.breed = target;
        Ok(())
    }

    // ── fields ──────────────────────────────────────────────────

    /// Declare one or more whitespace-separated field names for `scope`.
    pub fn own(&mut self, scope: Scope, names: &str) -> Result<(), AgentError> {
        let list = match scope {
            Scope::Base => &mut self.own_variables,
            Scope::Breed(b) => &mut self.breed_mut(b)?.own_variables,
        };
        for name in names.split_whitespace() {
            if !list.iter().any(|v| v == name) {
                list.push(name.to_owned());
            }
        }
        Ok(())
    }

    /// Fields declared for `scope`: the base list, plus the breed's own.
    pub fn own_variables(&self, scope: Scope) -> Vec<String> {
        let mut vars = self.own_variables.clone();
        if let Scope::Breed(b) = scope {
            if let Some(breed) = self.breed(b) {
                vars.extend(breed.own_variables.iter().cloned());
            }
        }
        vars
    }

    /// Set the default value of `name` for `scope`.
    pub fn set_default(
        &mut self,
        scope: Scope,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), AgentError> {
        let table = match scope {
            Scope::Base => &mut self.defaults,
            Scope::Breed(b) => &mut self.breed_mut(b)?.defaults,
        };
        table.insert(name.to_owned(), value.into());
        Ok(())
    }

    /// Default of `name` for `scope`: the breed table, then the base table.
    pub fn get_default(&self, scope: Scope, name: &str) -> Option<&Value> {
        let bred = match scope {
            Scope::Base => None,
            Scope::Breed(b) => self.breed(b).and_then(|br| br.defaults.get(name)),
        };
        bred.or_else(|| self.defaults.get(name))
    }

    /// Value of field `name` for `id`.
    pub fn var(&self, id: AgentId, name: &str) -> Option<&Value> {
        let record = self.store.get(&id)?;
        record.vars.get(name).or_else(|| {
            let scope = record.breed.map_or(Scope::Base, Scope::Breed);
            self.get_default(scope, name)
        })
    }

    /// Numeric value of field `name` for `id`.
    pub fn num(&self, id: AgentId, name: &str) -> Option<f64> {
        self.var(id, name).and_then(Value::as_f64)
    }

    /// Set field `name` on `id`, shadowing any default.
    pub fn set_var(
        &mut self,
        id: AgentId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), AgentError> {
        self.require_mut(id)?
            .vars
            .insert(name.to_owned(), value.into());
        Ok(())
    }

    /// Numeric field `name` for each member of `scope`, NaN where unset.
    pub fn nums(&self, scope: Scope, name: &str) -> AgentArray<f64> {
        self.members(scope)
            .props(|&id| self.num(id, name).unwrap_or(f64::NAN))
    }

    // ── iteration ───────────────────────────────────────────────

    /// Visit every member of `scope` with the set as context, using the
    /// protocol the scope calls for. See [`crate::ask::ask_set`].
    pub fn ask(&mut self, scope: Scope, f: impl FnMut(&mut Self, AgentId)) {
        crate::ask::ask_set(self, |s| s, scope, f);
    }

    /// Plain indexed loop over `scope`. See [`crate::ask::for_loop`].
    pub fn for_loop(&mut self, scope: Scope, f: impl FnMut(&mut Self, AgentId)) {
        crate::ask::for_loop(self, |s| s, scope, f);
    }
}
