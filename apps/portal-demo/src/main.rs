use std::io::{self, Write};
use std::rc::Rc;

use serde::Serialize;
use typeclient_compose::{
    provide_slot, slot, use_context_state, ComposeApplication, ComposeOptions, Template,
    TemplateExt,
};
use typeclient_core::{
    state_from, Application, ApplicationError, ApplicationOptions, Context, ControllerClass,
    StateRecord, STATUS_FATAL,
};
use typeclient_ui::{remember, Component, Host, Node};

/// Prints every committed tree as one line of markup.
struct TerminalHost {
    frame: u64,
}

impl Host for TerminalHost {
    fn commit(&mut self, tree: &Node) {
        self.frame += 1;
        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "[frame {:>2}] {tree}", self.frame) {
            log::error!("failed to write frame: {err}");
        }
    }

    fn clear(&mut self) {
        log::info!("terminal host cleared after {} frames", self.frame);
    }
}

struct Library {
    books: Vec<&'static str>,
}

impl Library {
    fn catalog(&self, ctx: &Context) -> Node {
        let first_seen = remember(|| ctx.id());
        let page = use_context_state(|state| state.get("page").and_then(|page| page.as_u64()))
            .flatten()
            .unwrap_or(1);
        let shelf = use_context_state(|state| {
            state
                .get("shelf")
                .and_then(|shelf| shelf.as_str())
                .map(str::to_string)
        })
        .flatten()
        .unwrap_or_else(|| "all".to_string());
        provide_slot("title", Node::text(format!("Catalog ({shelf})")));
        let books = self
            .books
            .iter()
            .map(|book| Node::element("li", [Node::text(*book)]));
        Node::fragment([
            Node::element("ul", books),
            Node::text(format!(" page {page}, mounted by request #{first_seen}")),
        ])
    }

    fn checkout(&self, ctx: &Context) -> Node {
        provide_slot("title", Node::text("Checkout"));
        Node::text(format!("checking out for request #{}", ctx.id()))
    }
}

struct Account {
    member: &'static str,
}

impl Account {
    fn profile(&self, ctx: &Context) -> Node {
        Node::element(
            "p",
            [Node::text(format!("{} (request #{})", self.member, ctx.id()))],
        )
    }
}

#[derive(Serialize)]
struct CatalogQuery<'a> {
    shelf: &'a str,
    page: u32,
}

fn layout() -> Template {
    Component::new("Layout", |content: &Node| {
        Node::element(
            "body",
            [Node::element("h1", [slot("title")]), content.clone()],
        )
    })
}

fn run() -> Result<(), ApplicationError> {
    let library = ControllerClass::builder::<Library>("Library")
        .render("catalog", Library::catalog)
        .render("checkout", Library::checkout)
        .template(layout())
        .build()?
        .instantiate(Library {
            books: vec!["Dune", "Hyperion", "Solaris"],
        })?;

    let account = ControllerClass::builder::<Account>("Account")
        .render("profile", Account::profile)
        .build()?
        .instantiate(Account { member: "ursula" })?;

    let bridge = ComposeApplication::new(TerminalHost { frame: 0 }, ComposeOptions::default());
    let app = Application::new(ApplicationOptions::default().with_name("library"), bridge);
    let bridge: &Rc<ComposeApplication> = app.lifecycle();

    let catalog = app.route(&library, "catalog")?;
    let checkout = app.route(&library, "checkout")?;
    let profile = app.route(&account, "profile")?;

    app.start()?;

    app.render(
        &catalog,
        state_from(&CatalogQuery {
            shelf: "sci-fi",
            page: 1,
        })?,
    )?;
    bridge.flush();

    let mut next_page = StateRecord::new();
    next_page.insert("page".into(), 2.into());
    let ctx = app.render(&catalog, next_page)?;
    bridge.flush();

    ctx.fail(STATUS_FATAL, Node::element("em", [Node::text("catalog unavailable")]));
    bridge.flush();

    app.render(&checkout, StateRecord::new())?;
    bridge.flush();

    app.render(&profile, StateRecord::new())?;
    bridge.flush();

    app.render_error(Node::element("pre", [Node::text("session expired")]));
    bridge.flush();

    bridge.unmount();
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("portal demo failed: {err}");
        std::process::exit(1);
    }
}
