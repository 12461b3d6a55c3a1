//! JSON snapshot of a model for debugging and regression checks.

use herd_agents::{AgentRecord, AgentSet, Scope, Value};
use herd_core::AgentId;
use serde_json::{json, Map, Value as Json};

use crate::model::Model;

/// Summarise `model`: its tick count, the size of each set, and one
/// randomly chosen agent from each.
///
/// The choice draws on the model's generator, so two models with the
/// same seed and history produce the same sample.
pub fn sample_model(model: &mut Model) -> Json {
    let patch = model.one_of_patches(Scope::Base);
    let turtle = model.one_of_turtles(Scope::Base);
    let link = model.one_of_links(Scope::Base);
    let model = &*model;
    json!({
        "ticks": model.ticks(),
        "patches": model.patches.len(),
        "patch": patch.map_or(Json::Null, |id| patch_json(model, id)),
        "turtles": model.turtles.set().len(Scope::Base),
        "turtle": turtle.map_or(Json::Null, |id| turtle_json(model, id)),
        "links": model.links.set().len(Scope::Base),
        "link": link.map_or(Json::Null, |id| link_json(model, id)),
    })
}

fn patch_json(model: &Model, id: AgentId) -> Json {
    let set = model.patches.set();
    let mut obj = base_json(set, id);
    if let Some((x, y)) = model.patches.xy_of(id) {
        obj.insert("x".into(), json!(x));
        obj.insert("y".into(), json!(y));
    }
    Json::Object(obj)
}

fn turtle_json(model: &Model, id: AgentId) -> Json {
    let set = model.turtles.set();
    let mut obj = base_json(set, id);
    if let Some(s) = set.state(id) {
        obj.insert("x".into(), Json::from(s.x));
        obj.insert("y".into(), Json::from(s.y));
        obj.insert("z".into(), s.z.map_or(Json::Null, Json::from));
        if let Ok(h) = model.turtles.heading(id) {
            obj.insert("heading".into(), Json::from(h));
        }
    }
    Json::Object(obj)
}

fn link_json(model: &Model, id: AgentId) -> Json {
    let set = model.links.set();
    let mut obj = base_json(set, id);
    if let Some(s) = set.state(id) {
        obj.insert("end0".into(), Json::from(s.end0.0));
        obj.insert("end1".into(), Json::from(s.end1.0));
        obj.insert("width".into(), Json::from(s.width));
    }
    Json::Object(obj)
}

fn base_json<S>(set: &AgentSet<S>, id: AgentId) -> Map<String, Json> {
    let mut obj = Map::new();
    obj.insert("id".into(), Json::from(id.0));
    let Some(record) = set.get(id) else {
        return obj;
    };
    let breed = record.breed().and_then(|b| set.breed_name(b));
    obj.insert("breed".into(), breed.map_or(Json::Null, Json::from));
    obj.insert("vars".into(), vars_json(record));
    obj
}

fn vars_json<S>(record: &AgentRecord<S>) -> Json {
    record
        .vars()
        .iter()
        .map(|(k, v)| (k.clone(), value_json(v)))
        .collect::<Map<_, _>>()
        .into()
}

fn value_json(v: &Value) -> Json {
    match v {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => Json::from(*n),
        Value::Text(s) => Json::String(s.clone()),
        Value::Agent(id) => Json::from(id.0),
    }
}
