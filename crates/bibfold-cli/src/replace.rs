use std::collections::BTreeMap;

/// Render the key-replacement shell script for a survivor → subsumed-keys
/// map. Each substitution is echoed before it runs so the batch is
/// auditable.
pub fn render_script(dup_map: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = String::from(
        "#!/usr/bin/env bash\n\
         set -e\n\
         tex_files=$(find ./ -type f | grep -E '\\.tex$')\n\
         \n\
         for f in $tex_files\n\
         do\n\
         \techo \"Processing ${f} ...\"\n",
    );
    for (survivor, subsumed) in dup_map {
        for duplicate in subsumed {
            out.push_str(&format!(
                "\techo \"sed -i 's/{duplicate}/{survivor}/g' $f\"\n"
            ));
            out.push_str(&format!("\tsed -i 's/{duplicate}/{survivor}/g' $f\n"));
        }
    }
    out.push_str("done\n");
    out
}
