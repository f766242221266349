use crate::output::Output;

pub const TOKEN_INSTRUCTIONS: &[(&str, &[&str])] = &[
    (
        "Option 1 - Via Web Interface:",
        &[
            "1. Open any item in your Plex web interface",
            "2. Click 'Get Info' or the (i) icon",
            "3. Click 'View XML' at the bottom",
            "4. Look at the URL - your token is after '?X-Plex-Token='",
        ],
    ),
    (
        "Option 2 - Via Account Settings:",
        &[
            "1. Go to https://app.plex.tv/desktop/#!/settings/account",
            "2. Scroll down and enable 'Show Advanced'",
            "3. At the bottom right, you'll see your token",
        ],
    ),
    (
        "Option 3 - Via Browser Console:",
        &[
            "1. Open your Plex web interface",
            "2. Open browser console (F12)",
            "3. Type: localStorage.getItem('myPlexAccessToken')",
        ],
    ),
];

pub fn print_token_instructions(output: &Output) {
    output.println("");
    output.heading("HOW TO GET YOUR PLEX TOKEN");
    for (title, steps) in TOKEN_INSTRUCTIONS {
        output.println(format!("\n{}", title));
        for step in *steps {
            output.println(format!("  {}", step));
        }
    }
    output.rule();
    output.println("");
}

pub fn print_missing_token(output: &Output) {
    output.error("No Plex token found!");
    print_token_instructions(output);

    output.println("Please set your Plex token as an environment variable:");
    output.println("  export PLEX_TOKEN='your-token-here'");
    output.println("\nOr add it to the [plex] section of your config file:");
    output.println("  token = \"your-token-here\"");
    output.println("\nOptionally, you can also set:");
    output.println("  export PLEX_URL='https://your-plex-url.com'");
    output.println("  export PLEX_LIBRARY='Movies'");
    output.println("  export COLLECTION_NAME='James Bond'");
}
