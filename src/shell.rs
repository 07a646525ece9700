// Line-oriented front end over a `Studio`.
//
// Generation commands are spawned so the prompt stays usable while they run; their
// outcomes come back as `Action`s on an unbounded channel.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::command::{Command, CommandError, HELP};
use crate::error::Result;
use crate::gate::Operation;
use crate::gateway::Generator;
use crate::language::Localizer;
use crate::library::TemplateLibrary;
use crate::scene::SceneImage;
use crate::studio::{Studio, notice};
use crate::template::{Bindings, TemplateId, blank_bindings};

const WRAP_WIDTH: usize = 88;

pub enum Action {
    StoryGenerated(Result<String>),
    StoryFormatted(Result<String>),
    StoryboardGenerated(Result<usize>),
    ImageSettled(usize, Result<()>),
    TemplateOptimized(TemplateId, Result<()>),
}

/// The story generation form: variable bindings and topic for the selected template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryForm {
    pub bindings: Bindings,
    pub topic: String,
}

impl StoryForm {
    pub fn new(library: &TemplateLibrary) -> Self {
        let mut form = Self::default();
        form.reset(library);
        form
    }

    /// Blanks the form for whatever template is selected now.
    pub fn reset(&mut self, library: &TemplateLibrary) {
        self.bindings = library
            .selected()
            .map(|t| blank_bindings(&t.content))
            .unwrap_or_default();
        self.topic.clear();
    }

    /// Resets the form only when `changed` is the selected template.
    pub fn template_changed(&mut self, library: &TemplateLibrary, changed: &TemplateId) {
        if library.selected_id().as_ref() == Some(changed) {
            self.reset(library);
        }
    }
}

pub struct Shell<G> {
    studio: Arc<Studio<G>>,
    running: bool,
    form: StoryForm,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

impl<G: Generator + 'static> Shell<G> {
    pub fn new(studio: Arc<Studio<G>>) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        let form = StoryForm::new(studio.library());
        Self {
            studio,
            running: true,
            form,
            action_sender,
            action_receiver,
        }
    }

    fn t(&self) -> Localizer {
        self.studio.localizer()
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", self.t().t("appTitle"));
        println!("Type `help` for commands.");
        prompt();

        while self.running {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => self.handle_line(&line),
                        None => break,
                    }
                    if self.running {
                        prompt();
                    }
                }
                Some(action) = self.action_receiver.recv() => {
                    self.handle_action(action);
                    prompt();
                }
            }
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(CommandError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    fn handle_command(&mut self, command: Command) {
        let t = self.t();
        let library = self.studio.library();
        match command {
            Command::Help => println!("{HELP}"),
            Command::Quit => self.running = false,
            Command::Templates => self.print_templates(),
            Command::New => {
                library.begin_new();
                println!("{}", t.t("newTemplate"));
            }
            Command::Edit(reference) => match self.resolve(&reference) {
                Some(id) if library.begin_edit(&id) => {
                    let session = library.session();
                    println!("{}: {}", t.t("editTemplate"), session.name);
                    println!("{}", session.content);
                }
                _ => println!("{}", t.t("templateNotFound")),
            },
            Command::Name(name) => library.set_draft_name(name),
            Command::Content(content) => library.set_draft_content(content),
            Command::Save => {
                let editing = library.session().editing.is_some();
                match library.save_draft() {
                    Some(id) => {
                        let label = if editing { "saveChanges" } else { "addTemplate" };
                        println!("{}: {id}", t.t(label));
                        self.form.template_changed(library, &id);
                    }
                    None => println!("{}", t.t("templateRequired")),
                }
            }
            Command::Cancel => library.cancel_edit(),
            Command::Delete(reference) => match self.resolve(&reference) {
                Some(id) => {
                    let was_selected = library.selected_id().as_ref() == Some(&id);
                    library.delete(&id);
                    if was_selected {
                        self.form.reset(library);
                    }
                }
                None => println!("{}", t.t("templateNotFound")),
            },
            Command::Select(reference) => {
                let id = match reference {
                    Some(reference) => match self.resolve(&reference) {
                        Some(id) => Some(id),
                        None => {
                            println!("{}", t.t("templateNotFound"));
                            return;
                        }
                    },
                    None => None,
                };
                library.select(id);
                self.form.reset(library);
                self.print_vars();
            }
            Command::Vars => self.print_vars(),
            Command::Set(name, value) => {
                self.form.bindings.insert(name, value);
            }
            Command::Topic(topic) => self.form.topic = topic,
            Command::Generate => self.spawn_generate(),
            Command::Story => self.print_story(),
            Command::Write(story) => self.studio.set_story(story),
            Command::Format => {
                println!("{}", t.t("formattingStory"));
                let (studio, sender) = (self.studio.clone(), self.action_sender.clone());
                tokio::spawn(async move {
                    let result = studio.format_story().await;
                    let _ = sender.send(Action::StoryFormatted(result));
                });
            }
            Command::Board => {
                println!("{}", t.t("generatingStoryboard"));
                let (studio, sender) = (self.studio.clone(), self.action_sender.clone());
                tokio::spawn(async move {
                    let result = studio.generate_storyboard().await;
                    let _ = sender.send(Action::StoryboardGenerated(result));
                });
            }
            Command::Scenes => self.print_scenes(),
            Command::Image(index) => {
                if self.studio.storyboard().scene(index).is_none() {
                    println!("{}", t.t("noStoryboard"));
                    return;
                }
                println!("{} #{}: {}", t.t("scene"), index + 1, t.t("generatingImage"));
                let (studio, sender) = (self.studio.clone(), self.action_sender.clone());
                tokio::spawn(async move {
                    let result = studio.generate_image(index).await;
                    let _ = sender.send(Action::ImageSettled(index, result));
                });
            }
            Command::Optimize(reference) => {
                let Some(id) = self.resolve(&reference) else {
                    println!("{}", t.t("templateNotFound"));
                    return;
                };
                if library.optimizing().is_some() {
                    println!("{}", t.t("busy"));
                    return;
                }
                println!("{}", t.t("optimizingTemplate"));
                let (studio, sender) = (self.studio.clone(), self.action_sender.clone());
                tokio::spawn(async move {
                    let result = studio.optimize_template(&id).await;
                    let _ = sender.send(Action::TemplateOptimized(id, result));
                });
            }
            Command::Lang(language) => {
                self.studio.set_language(language);
                println!("{}: {}", self.t().t("language"), language.native_name());
            }
        }
    }

    fn spawn_generate(&self) {
        let t = self.t();
        let (studio, sender) = (self.studio.clone(), self.action_sender.clone());
        let StoryForm { bindings, topic } = self.form.clone();
        println!("{}", t.t("generatingStory"));
        tokio::spawn(async move {
            let result = studio.generate_story(&bindings, &topic).await;
            let _ = sender.send(Action::StoryGenerated(result));
        });
    }

    fn handle_action(&mut self, action: Action) {
        let t = self.t();
        match action {
            Action::StoryGenerated(Ok(_)) | Action::StoryFormatted(Ok(_)) => self.print_story(),
            Action::StoryboardGenerated(Ok(_)) => self.print_scenes(),
            Action::ImageSettled(index, Ok(())) => {
                if let Some(SceneImage::Ready(url)) =
                    self.studio.storyboard().scene(index).map(|s| s.image())
                {
                    println!(
                        "{} #{}: {} ({} KB)",
                        t.t("scene"),
                        index + 1,
                        t.t("visual"),
                        url.len() / 1024
                    );
                }
            }
            Action::TemplateOptimized(id, Ok(())) => {
                let library = self.studio.library();
                if let Some(template) = library.get(&id) {
                    println!("{}: {}", t.t("autoOptimize"), template.name);
                    println!("{}", textwrap::fill(&template.content, WRAP_WIDTH));
                }
                self.form.template_changed(library, &id);
            }
            Action::StoryGenerated(Err(e))
            | Action::StoryFormatted(Err(e))
            | Action::StoryboardGenerated(Err(e))
            | Action::ImageSettled(_, Err(e))
            | Action::TemplateOptimized(_, Err(e)) => {
                log::error!("Operation failed: {e}");
                println!("{}", notice(&e, &t));
            }
        }
    }

    // Template references are a 1-based list position or a template id.
    fn resolve(&self, reference: &str) -> Option<TemplateId> {
        let templates = self.studio.library().templates();
        if let Ok(position) = reference.parse::<usize>() {
            if let Some(template) = position.checked_sub(1).and_then(|i| templates.get(i)) {
                return Some(template.id.clone());
            }
        }
        templates
            .into_iter()
            .find(|t| t.id.as_str() == reference)
            .map(|t| t.id)
    }

    fn print_templates(&self) {
        let t = self.t();
        let library = self.studio.library();
        let selected = library.selected_id();
        let optimizing = library.optimizing();
        println!("{}", t.t("promptTemplates"));
        for (position, template) in library.templates().iter().enumerate() {
            let marker = if selected.as_ref() == Some(&template.id) { '*' } else { ' ' };
            let busy = if optimizing.as_ref() == Some(&template.id) { " ..." } else { "" };
            println!("{marker} {}. {}{busy}  [{}]", position + 1, template.name, template.id);
            println!(
                "{}",
                textwrap::indent(&textwrap::fill(&template.content, WRAP_WIDTH - 5), "     ")
            );
        }
    }

    fn print_vars(&self) {
        let t = self.t();
        let Some(template) = self.studio.library().selected() else {
            println!("{}", t.t("selectTemplate"));
            return;
        };
        let placeholders = template.placeholders();
        if placeholders.is_empty() {
            println!("{}", t.t("noVariables"));
            return;
        }
        println!("{}", t.t("fillVariables"));
        for name in placeholders {
            let value = self.form.bindings.get(&name).map(String::as_str).unwrap_or_default();
            println!("  {name} = {value}");
        }
        println!("{}: {}", t.t("storyTopic"), self.form.topic);
    }

    fn print_story(&self) {
        let t = self.t();
        let story = self.studio.story();
        println!("{}", t.t("storyCanvas"));
        if story.is_empty() {
            println!("{}", t.t("storyPlaceholder"));
        } else {
            println!("{}", textwrap::fill(&story, WRAP_WIDTH));
        }
        match self.studio.processing() {
            Some(Operation::FormatStory) => println!("{}", t.t("formattingStory")),
            Some(Operation::GenerateStoryboard) => println!("{}", t.t("generatingStoryboard")),
            _ => {}
        }
    }

    fn print_scenes(&self) {
        let t = self.t();
        let scenes = self.studio.storyboard().scenes();
        if scenes.is_empty() {
            println!("{}", t.t("noStoryboard"));
            return;
        }
        println!("{}", t.t("storyboard"));
        for scene in scenes {
            println!("{} #{}", t.t("scene"), scene.scene_number);
            println!("  {}: {}", t.t("camera"), scene.camera_angle);
            println!("  {}: {}", t.t("setting"), scene.setting);
            println!("  {}: {}", t.t("action"), scene.action);
            let dialogue = if scene.dialogue.is_empty() { "N/A" } else { &scene.dialogue };
            println!("  {}: {dialogue}", t.t("dialogue"));
            match scene.image() {
                SceneImage::Empty => {}
                SceneImage::Loading => println!("  {}", t.t("generatingImage")),
                SceneImage::Ready(url) => {
                    println!("  {}: {} KB", t.t("visual"), url.len() / 1024)
                }
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
