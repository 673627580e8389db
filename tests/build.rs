use std::{cell::Cell, rc::Rc};

use dpcompile::{
    error::{DefinitionError, ScoreboardError},
    prelude::*,
    virtual_fs::{VFile, VFolder},
};

fn pack() -> Datapack {
    Datapack::new(PackConfig::new("Temp Pack", "tmp", "1.21.4")).expect("invalid config")
}

fn text<'a>(folder: &'a VFolder, path: &str) -> &'a str {
    folder
        .get_file(path)
        .and_then(VFile::as_text)
        .unwrap_or_else(|| panic!("{path} missing"))
}

fn json(folder: &VFolder, path: &str) -> serde_json::Value {
    serde_json::from_str(text(folder, path)).expect("invalid json")
}

#[test]
fn body_runs_once() {
    let runs = Rc::new(Cell::new(0));
    let dp = pack();

    let counter = Rc::clone(&runs);
    let script = dp
        .mcfn("counted", move |ctx| {
            counter.set(counter.get() + 1);
            ctx.raw("say counted")?;
            Ok(())
        })
        .expect("definition failed");

    assert!(script.is_rendered());
    let first = script.render().expect("render failed");
    assert_eq!(script.render().expect("render failed"), first);

    dp.compile().expect("compile failed");
    assert_eq!(runs.get(), 1);
}

#[test]
fn header_and_line_order() {
    let dp = pack();
    dp.mcfn_with(
        "ordered",
        ScriptOptions::default().with_description("First line\nSecond line"),
        |ctx| {
            ctx.raw("say 1")?;
            ctx.comment("two")?;
            ctx.raw("say 3")?;
            ctx.insert(0, "say 0")?;
            Ok(())
        },
    )
    .expect("definition failed");
    dp.mcfn("empty", |_| Ok(())).expect("definition failed");

    let folder = dp.compile().expect("compile failed");
    assert_eq!(
        text(&folder, "data/tmp/function/ordered.mcfunction"),
        [
            "# This script was automatically generated for [Temp Pack]",
            "# MC Version: 1.21.4 [61]",
            "# ---",
            "# First line",
            "# Second line",
            "",
            "say 0",
            "say 1",
            "# two",
            "say 3",
        ]
        .join("\n")
    );
    assert_eq!(
        text(&folder, "data/tmp/function/empty.mcfunction"),
        "# No content generated for empty.mcfunction"
    );
}

#[test]
fn dev_content_only_in_debug_builds() {
    let build = |debug: bool| {
        let dp = Datapack::new(PackConfig::new("Temp Pack", "tmp", "1.21.4").with_debug(debug))
            .expect("invalid config");
        let tool = dp
            .mcfn_with("tool", ScriptOptions::default().with_dev(true), |ctx| {
                ctx.raw("say tool")?;
                Ok(())
            })
            .expect("definition failed");
        dp.mcfn_with(
            "main",
            ScriptOptions::default().with_sort(Sort::Tick),
            move |ctx| {
                ctx.log(LogLevel::Warning, "hi")?;
                ctx.call(&tool)?;
                ctx.raw("say main")?;
                Ok(())
            },
        )
        .expect("definition failed");
        dp.compile().expect("compile failed")
    };

    let debug = build(true);
    assert!(debug.get_file("data/tmp/function/tool.mcfunction").is_some());
    assert!(text(&debug, "data/tmp/function/main.mcfunction").ends_with(
        "tellraw @a {\"color\":\"yellow\",\"text\":\"[main | warning] - hi\"}\nfunction tmp:tool\nsay main"
    ));

    let production = build(false);
    assert!(production
        .get_file("data/tmp/function/tool.mcfunction")
        .is_none());
    let main = text(&production, "data/tmp/function/main.mcfunction");
    assert!(!main.contains("tellraw"));
    assert!(!main.contains("function tmp:tool"));
    assert!(main.ends_with("\n\nsay main"));
}

#[test]
fn calls_resolve_to_namespaced_paths() {
    let dp = pack();
    let outer = dp.module("outer").expect("invalid name");
    let inner = outer.module("inner").expect("invalid name");

    let init = inner
        .mcfn("init", |ctx| {
            ctx.raw("say init")?;
            Ok(())
        })
        .expect("definition failed");
    assert_eq!(init.call_name().expect("not attached"), "tmp:outer/inner/init");

    let moved = outer
        .mcfn_with("moved", ScriptOptions::default().with_path("extra"), |_| Ok(()))
        .expect("definition failed");
    assert_eq!(moved.call_name().expect("not attached"), "tmp:extra/outer/moved");

    dp.mcfn("main", move |ctx| {
        ctx.call(&init)?;
        ctx.call(&moved)?;
        Ok(())
    })
    .expect("definition failed");

    let folder = dp.compile().expect("compile failed");
    assert!(folder
        .get_file("data/tmp/function/outer/inner/init.mcfunction")
        .is_some());
    assert!(folder
        .get_file("data/tmp/function/extra/outer/moved.mcfunction")
        .is_some());
    assert!(text(&folder, "data/tmp/function/main.mcfunction")
        .ends_with("function tmp:outer/inner/init\nfunction tmp:extra/outer/moved"));
}

#[test]
fn duplicate_names_are_rejected() {
    let dp = pack();
    dp.mcfn("same", |_| Ok(())).expect("definition failed");

    assert!(matches!(
        dp.mcfn("same", |_| Ok(())),
        Err(PackError::Definition(DefinitionError::DuplicateScript { .. }))
    ));
    assert!(matches!(
        dp.mcfn("Not Valid", |_| Ok(())),
        Err(PackError::Definition(DefinitionError::InvalidName { .. }))
    ));

    let module = dp.module("other").expect("invalid name");
    assert!(module.mcfn("same", |_| Ok(())).is_ok());
}

#[test]
fn scoreboards_are_initialized_on_load() {
    let dp = pack();
    let kills = dp.scoreboard("kills", Criteria::Dummy).expect("invalid scoreboard");
    dp.scoreboard("unused", Criteria::Dummy)
        .expect("invalid scoreboard");
    assert!(dp.scoreboard("kills", Criteria::Dummy).is_ok());
    assert!(matches!(
        dp.scoreboard("kills", Criteria::DeathCount),
        Err(ScoreboardError::CriteriaConflict { .. })
    ));

    dp.mcfn("score", move |ctx| {
        ctx.add(kills.add("@s", 1))?;
        ctx.add(kills.reset("@a"))?;
        Ok(())
    })
    .expect("definition failed");

    let folder = dp.compile().expect("compile failed");
    assert!(text(&folder, "data/tmp/function/score.mcfunction")
        .ends_with("scoreboard players add @s tmp_kills 1\nscoreboard players set @a tmp_kills 0"));

    let init = text(&folder, "data/tmp/function/initialize_scoreboards.mcfunction");
    assert!(init.contains("# Auto-generated function that initializes all required scoreboards"));
    assert!(init.ends_with("\n\nscoreboard objectives add tmp_kills dummy"));
    assert!(!init.contains("tmp_unused"));

    assert_eq!(
        json(&folder, "data/minecraft/tags/function/load.json"),
        serde_json::json!({"values": ["tmp:initialize_scoreboards"]})
    );
}

#[test]
fn placeholders_complete_forward_references() {
    let dp = pack();
    let later = dp.find("later").expect("invalid name");
    assert!(later.is_placeholder());
    dp.add_script_to_taglist(&later, Sort::Tick);

    let caller = Rc::clone(&later);
    dp.mcfn("early", move |ctx| {
        ctx.call(&caller)?;
        Ok(())
    })
    .expect("definition failed");

    let defined = dp
        .mcfn("later", |ctx| {
            ctx.raw("say later")?;
            Ok(())
        })
        .expect("definition failed");
    assert!(Rc::ptr_eq(&defined, &later));
    assert!(!later.is_placeholder());

    let folder = dp.compile().expect("compile failed");
    assert!(text(&folder, "data/tmp/function/early.mcfunction").ends_with("function tmp:later"));
    assert_eq!(
        json(&folder, "data/minecraft/tags/function/tick.json"),
        serde_json::json!({"values": ["tmp:later"]})
    );
}

#[test]
fn placeholder_defined_as_dev_drops_its_calls() {
    let dp = Datapack::new(PackConfig::new("Temp Pack", "tmp", "1.21.4").with_debug(false))
        .expect("invalid config");
    let later = dp.find("later").expect("invalid name");

    let caller = Rc::clone(&later);
    dp.mcfn("early", move |ctx| {
        ctx.call(&caller)?;
        ctx.raw("say early")?;
        Ok(())
    })
    .expect("definition failed");
    dp.mcfn_with("later", ScriptOptions::default().with_dev(true), |ctx| {
        ctx.raw("say later")?;
        Ok(())
    })
    .expect("definition failed");
    assert!(later.is_dev());

    let folder = dp.compile().expect("compile failed");
    assert!(folder.get_file("data/tmp/function/later.mcfunction").is_none());
    let early = text(&folder, "data/tmp/function/early.mcfunction");
    assert!(!early.contains("function tmp:later"));
    assert!(early.ends_with("\n\nsay early"));
}

#[test]
fn placeholder_created_while_rendering_must_be_defined() {
    let dp = pack();
    let generated = dp.module("gen").expect("invalid name");

    let module = generated.clone();
    dp.mcfn("outer", move |_| {
        let inner_module = module.clone();
        module.mcfn("inner", move |ctx| {
            let ghost = inner_module.find("ghost")?;
            ctx.call(&ghost)?;
            Ok(())
        })?;
        Ok(())
    })
    .expect("definition failed");

    assert!(matches!(
        dp.compile(),
        Err(PackError::IncompletePlaceholder(name)) if name == "tmp:gen/ghost"
    ));
}

#[test]
fn scoreboards_are_initialized_in_first_use_order() {
    let dp = pack();
    let first = dp.scoreboard("a", Criteria::Dummy).expect("invalid scoreboard");
    let second = dp.scoreboard("b", Criteria::Dummy).expect("invalid scoreboard");

    dp.mcfn("score", move |ctx| {
        ctx.add(second.set("@s", 1))?;
        ctx.add(first.set("@s", 2))?;
        Ok(())
    })
    .expect("definition failed");
    assert_eq!(
        dp.used_scoreboards()
            .iter()
            .map(|board| board.name().to_string())
            .collect::<Vec<_>>(),
        vec!["b", "a"]
    );

    let folder = dp.compile().expect("compile failed");
    assert!(text(&folder, "data/tmp/function/initialize_scoreboards.mcfunction").ends_with(
        "\n\nscoreboard objectives add tmp_b dummy\nscoreboard objectives add tmp_a dummy"
    ));
}

#[test]
fn incomplete_placeholder_fails_the_build() {
    let dp = pack();
    dp.find("ghost").expect("invalid name");

    assert!(matches!(
        dp.compile(),
        Err(PackError::IncompletePlaceholder(name)) if name == "tmp:ghost"
    ));
}

#[test]
fn failing_body_names_the_script() {
    let dp = pack();
    let module = dp.module("outer").expect("invalid name");

    let err = module
        .mcfn("broken", |ctx| {
            ctx.raw("say before")?;
            Err("boom".into())
        })
        .expect_err("definition should fail");

    let PackError::Render { source, pack, .. } = err else {
        panic!("expected a render error");
    };
    assert_eq!(pack, "Temp Pack");
    assert_eq!(source.name(), "broken");
    assert_eq!(source.call_name(), "tmp:outer/broken");
    assert_eq!(source.file(), "data/tmp/function/outer/broken.mcfunction");
    assert_eq!(source.inner().to_string(), "boom");
}

#[test]
fn scripts_defined_while_rendering_are_deferred() {
    let dp = pack();
    let generated = dp.module("generated").expect("invalid name");

    let module = generated.clone();
    dp.mcfn("outer", move |ctx| {
        let inner = module.mcfn("inner", |ctx| {
            ctx.raw("say inner")?;
            Ok(())
        })?;
        ctx.call(&inner)?;
        Ok(())
    })
    .expect("definition failed");

    let inner = generated.scripts().pop().expect("inner not defined");
    assert!(!inner.is_rendered());

    let folder = dp.compile().expect("compile failed");
    assert!(inner.is_rendered());
    assert!(text(&folder, "data/tmp/function/generated/inner.mcfunction").ends_with("say inner"));
    assert!(text(&folder, "data/tmp/function/outer.mcfunction")
        .ends_with("function tmp:generated/inner"));
}

#[test]
fn older_versions_use_plural_directories() {
    let dp = Datapack::new(PackConfig::new("Old Pack", "old", "1.20.4")).expect("invalid config");
    assert_eq!(dp.pack_format(), 26);
    dp.mcfn_with(
        "tick",
        ScriptOptions::default().with_sort(Sort::Tick),
        |ctx| {
            ctx.raw("say tick")?;
            Ok(())
        },
    )
    .expect("definition failed");

    let folder = dp.compile().expect("compile failed");
    assert!(folder.get_file("data/old/functions/tick.mcfunction").is_some());
    assert!(folder
        .get_file("data/minecraft/tags/functions/tick.json")
        .is_some());
    assert_eq!(json(&folder, "pack.mcmeta")["pack"]["pack_format"], 26);
}

#[test]
fn rebuild_replaces_previous_output() {
    let out = tempfile::tempdir().expect("error creating tempdir");
    let config = PackConfig::new("Temp Pack", "tmp", "1.21.4").with_out_dir(out.path());

    let build = || {
        let dp = Datapack::new(config.clone()).expect("invalid config");
        dp.mcfn("main", |ctx| {
            ctx.raw("say main")?;
            Ok(())
        })
        .expect("definition failed");
        dp.build().expect("build failed")
    };

    let path = build();
    assert_eq!(path, out.path().join("Temp Pack"));
    let first = std::fs::read_to_string(path.join("data/tmp/function/main.mcfunction"))
        .expect("main missing");
    std::fs::write(path.join("stale.txt"), "stale").expect("write failed");

    let path = build();
    assert!(!path.join("stale.txt").exists());
    assert!(path.join("pack.mcmeta").is_file());
    assert_eq!(
        std::fs::read_to_string(path.join("data/tmp/function/main.mcfunction"))
            .expect("main missing"),
        first
    );
}

#[test]
fn missing_output_directory_fails() {
    let out = tempfile::tempdir().expect("error creating tempdir");
    let dp = Datapack::new(
        PackConfig::new("Temp Pack", "tmp", "1.21.4").with_out_dir(out.path().join("missing")),
    )
    .expect("invalid config");

    assert!(matches!(
        dp.build(),
        Err(PackError::MissingOutputDirectory(_))
    ));
}

#[derive(Debug)]
struct Recorder {
    files: Rc<Cell<usize>>,
    failed: Rc<Cell<bool>>,
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn render_file(
        &self,
        _info: &dpcompile::datapack::PackInfo,
        _path: &str,
        _file_name: &str,
        _content: &str,
    ) -> Result<(), BoxError> {
        self.files.set(self.files.get() + 1);
        Ok(())
    }

    fn on_build_error(&self, _info: &dpcompile::datapack::PackInfo, _error: &PackError) {
        self.failed.set(true);
    }
}

#[test]
fn plugin_hooks_run() {
    let files = Rc::new(Cell::new(0));
    let failed = Rc::new(Cell::new(false));
    let recorder = || Recorder {
        files: Rc::clone(&files),
        failed: Rc::clone(&failed),
    };

    let dp = pack().with_plugin(recorder());
    dp.mcfn("one", |_| Ok(())).expect("definition failed");
    dp.compile().expect("compile failed");
    assert_eq!(files.get(), 1);
    assert!(!failed.get());

    let dp = pack().with_plugin(recorder());
    dp.find("ghost").expect("invalid name");
    assert!(dp.compile().is_err());
    assert!(failed.get());
}

#[derive(Debug)]
struct Greeter;

impl Template for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    fn define(&self, module: &Module) -> Result<(), PackError> {
        module.mcfn_with(
            "greet",
            ScriptOptions::default().with_sort(Sort::Load),
            |ctx| {
                ctx.raw("say Hello!")?;
                Ok(())
            },
        )?;
        Ok(())
    }
}

#[test]
fn templates_get_their_own_module() {
    let dp = pack();
    let module = dp.add_template(&Greeter).expect("template failed");
    assert_eq!(module.name(), "greeter");

    let folder = dp.compile().expect("compile failed");
    assert!(text(&folder, "data/tmp/function/greeter/greet.mcfunction").ends_with("say Hello!"));
    assert_eq!(
        json(&folder, "data/minecraft/tags/function/load.json"),
        serde_json::json!({"values": ["tmp:greeter/greet"]})
    );
}

#[test]
fn advancements_reward_scripts() {
    let dp = pack();
    let reward = dp
        .mcfn("reward", |ctx| {
            ctx.raw("say well done")?;
            Ok(())
        })
        .expect("definition failed");
    dp.add_advancement(
        dpcompile::datapack::file::Advancement::new("first_steps")
            .with_criterion("tick", serde_json::json!({"trigger": "minecraft:tick"}))
            .with_reward_function(&reward),
    );

    let folder = dp.compile().expect("compile failed");
    assert_eq!(
        json(&folder, "data/tmp/advancement/first_steps.json"),
        serde_json::json!({
            "criteria": {"tick": {"trigger": "minecraft:tick"}},
            "rewards": {"function": "tmp:reward"}
        })
    );
}
