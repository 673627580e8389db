use std::path::Path;

// import the prelude to get all the necessary types
use dpcompile::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), PackError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    std::fs::create_dir_all("./dist").map_err(|err| PackError::Io {
        path: "./dist".into(),
        source: err,
    })?;

    // create a new datapack writing into "./dist"
    let pack = Datapack::new(
        PackConfig::new("Example Pack", "example", "1.21.4")
            .with_description("Example pack built with dpcompile")
            .with_out_dir(Path::new("./dist")),
    )?
    .with_plugin(DevelopmentKit::new())
    .with_plugin(VerboseLogging::new().with_files(false));

    // "bar" is called before it is defined
    let bar = pack.find("bar")?;

    let deaths = pack.scoreboard("deaths", Criteria::DeathCount)?;
    pack.mcfn_with(
        "foo",
        ScriptOptions::default()
            .with_sort(Sort::Tick)
            .with_description("Runs every tick"),
        move |ctx| {
            ctx.raw("say Hello, world!")?;
            ctx.log(LogLevel::Info, "foo ran")?;
            ctx.add(deaths.reset("@a[scores={example_deaths=1..}]"))?;
            ctx.call(&bar)?;
            Ok(())
        },
    )?;

    // modules place their scripts in subdirectories
    let util = pack.module("util")?;
    util.mcfn("announce", |ctx| {
        ctx.add(Execute::As(
            "@a".to_string(),
            Box::new(Execute::If(
                Condition::from("block ~ ~-1 ~ minecraft:stone")
                    & !Condition::from("entity @s[tag=quiet]"),
                Box::new(Execute::run("say standing on stone")),
            )),
        ))?;
        Ok(())
    })?;

    pack.mcfn("bar", |ctx| {
        ctx.comment("bar is defined after foo referenced it")?;
        Ok(())
    })?;

    let path = pack.build()?;
    tracing::info!("Pack written to {}", path.display());
    Ok(())
}
