//! The banner printed before an interactive session.

pub const BANNER: &str = r"
+--------------------------------------------------------------+
|                                                              |
|    _   _   _   _   ___  __  __      __     __  _  _          |
|   | | | | | \ | | |_ _| \ \/ /      \ \   / / | || |         |
|   | | | | |  \| |  | |   \  /        \ \ / /  | || |_        |
|   | |_| | | |\  |  | |   /  \         \ V /   |__   _|       |
|    \___/  |_| \_| |___| /_/\_\         \_/       |_|         |
|                                                              |
|           Bell Telephone Laboratories, 1973                  |
|                                                              |
|   The first Unix with its kernel written in C                |
|                                                              |
|   Type 'help' for commands, 'exit' to quit                   |
|                                                              |
+--------------------------------------------------------------+
";
