use {
    clap::{Args, Command, CommandFactory, ValueEnum},
    clap_complete::Generator,
    flipbook::Result,
    std::io,
};

#[allow(clippy::enum_variant_names)]
#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    PowerShell,
    Zsh,
    Nushell,
    Clink,
}

impl Generator for Shell {
    fn file_name(&self, name: &str) -> String {
        match self {
            Self::Bash => format!("{name}.bash"),
            Self::Elvish => format!("{name}.elv"),
            Self::Fish => format!("{name}.fish"),
            Self::PowerShell => format!("_{name}.ps1"),
            Self::Zsh => format!("_{name}"),
            Self::Nushell => clap_complete_nushell::Nushell.file_name(name),
            Self::Clink => clap_complete_clink::Clink.file_name(name),
        }
    }

    fn generate(&self, cmd: &Command, buf: &mut dyn io::Write) {
        match self {
            Self::Bash => clap_complete::shells::Bash.generate(cmd, buf),
            Self::Elvish => clap_complete::shells::Elvish.generate(cmd, buf),
            Self::Fish => clap_complete::shells::Fish.generate(cmd, buf),
            Self::PowerShell => clap_complete::shells::PowerShell.generate(cmd, buf),
            Self::Zsh => clap_complete::shells::Zsh.generate(cmd, buf),
            Self::Nushell => clap_complete_nushell::Nushell.generate(cmd, buf),
            Self::Clink => clap_complete_clink::Clink.generate(cmd, buf),
        }
    }
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Shell to generate completions for
    shell: Shell,
}

pub fn execute(args: CompleteArgs) -> Result<()> {
    let mut app = crate::cli::Cli::command();
    let bin_name = app.get_name().to_string();
    clap_complete::generate(args.shell, &mut app, bin_name, &mut io::stdout());

    Ok(())
}
