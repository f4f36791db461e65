use notes_types::{Note, NoteFilter, Visibility};
use serde_json::json;

fn note(id: i64, title: &str, visibility: &str, tags: &[&str]) -> Note {
    let tags: Vec<_> = tags
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "id": i, "nom": t }))
        .collect();
    serde_json::from_value(json!({
        "id": id,
        "titre": title,
        "contenu": format!("contenu de {title}"),
        "visibilite": visibility,
        "tags": tags,
        "owner_id": 1,
        "date_creation": "2024-01-01T00:00:00"
    }))
    .unwrap()
}

fn notes() -> Vec<Note> {
    vec![
        note(1, "Recette", "prive", &["cuisine"]),
        note(2, "Projet", "partage", &["travail", "urgent"]),
        note(3, "Blog", "public", &["travail"]),
    ]
}

#[test]
fn empty_filter_keeps_everything() {
    let all = notes();
    assert_eq!(NoteFilter::new().apply(&all).len(), 3);
}

#[test]
fn filter_by_visibility() {
    let all = notes();
    let hits = NoteFilter::new().visibility(Visibility::Public).apply(&all);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Blog");
}

#[test]
fn filter_by_all_requested_tags() {
    let all = notes();
    let hits = NoteFilter::new().tag("travail").apply(&all);
    assert_eq!(hits.len(), 2);

    let hits = NoteFilter::new().tag("travail").tag("urgent").apply(&all);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Projet");
}

#[test]
fn filter_by_search_text() {
    let all = notes();
    let hits = NoteFilter::new().search("recette").apply(&all);
    assert_eq!(hits.len(), 1);
}

#[test]
fn blank_search_is_ignored() {
    let filter = NoteFilter::new().search("   ");
    assert!(filter.search.is_none());
    assert_eq!(filter.apply(&notes()).len(), 3);
}

#[test]
fn criteria_combine() {
    let all = notes();
    let hits = NoteFilter::new()
        .visibility(Visibility::Shared)
        .tag("travail")
        .search("projet")
        .apply(&all);
    assert_eq!(hits.len(), 1);

    let none = NoteFilter::new()
        .visibility(Visibility::Private)
        .tag("travail")
        .apply(&all);
    assert!(none.is_empty());
}
