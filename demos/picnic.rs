//! Picnic demo: author a template, save it, reload it and play it.
//!
//! Run with: cargo run --example picnic

use fluke_engine::core::player::PlayerSession;
use fluke_engine::core::session::EditorSession;
use fluke_engine::schema::prompt::format_indices;
use fluke_engine::store::FlukeStore;

fn main() {
    // --- Author ---
    let mut editor = EditorSession::new();
    let name = editor.rows()[0].index;
    editor
        .set_prompt(name, "A person's name")
        .expect("row 1 exists");
    let food = editor.add_prompt().expect("indices available");
    editor
        .set_prompt(food, "A food (plural)")
        .expect("row just added");
    let spare = editor.add_prompt().expect("indices available");
    editor
        .set_prompt(spare, "An animal")
        .expect("row just added");

    editor.set_title(format!("{}'s Picnic", name.token()));
    editor.set_body(format!(
        "{} packed a basket of {} and headed for the park.",
        name.token(),
        food.token()
    ));

    let check = editor.check();
    if !check.unused.is_empty() {
        println!("Note: prompts never used: {}", format_indices(&check.unused));
    }

    // --- Store ---
    let dir = std::env::temp_dir().join("fluke-demo");
    let store = FlukeStore::new(&dir);
    let template = editor
        .save(&store, Some("picnic"))
        .expect("failed to save template");
    println!("Saved {}", dir.join(template.filename()).display());
    let loaded = store
        .load(template.filename())
        .expect("failed to reload template");

    // --- Play ---
    let mut player = PlayerSession::new(loaded);
    for (index, prompt) in player
        .prompts()
        .map(|(i, p)| (i, p.to_string()))
        .collect::<Vec<_>>()
    {
        let answer = match prompt.as_str() {
            "A person's name" => "Ada",
            "A food (plural)" => "  pickles ",
            _ => "heron",
        };
        println!("{prompt}: {answer}");
        player.answer(index, answer).expect("prompt exists");
    }

    let story = player.play().expect("all prompts answered");
    println!("\n{}", story.render());
}
