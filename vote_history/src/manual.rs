/*!

This is the long-form manual for `vote_history` and `wardbooks`.

## Input

A voter history extract, as published by the county boards of elections: one row per registered
voter, with the voter information first and then one column per past election. The election
columns are named after the type and the date of the election:

| ... | WARD          | PRIMARY-03/07/2000 | GENERAL-11/07/2000 | ... |
|-----|---------------|--------------------|--------------------|-----|
| ... | WARREN-WARD 1 | D                  |                    | ... |
| ... | WARREN-WARD 2 |                    | R                  | ... |

Each election cell contains the party ballot the voter asked for (`D`, `R`, ...) or nothing when
the voter did not vote. All the election columns are expected at the end of the table. A column
with another name placed after the first election column is reported and the file is skipped.

Header names are compared without regard to case or surrounding spaces.

## Derived columns

The following columns are added after the ward column. They are written as formulas, so that
they stay correct when the workbook is edited.

* `Total:` the number of elections in which the voter took part
* `Dems` the number of Democratic ballots
* `REPS` the number of Republican ballots
* `Muni` the number of Democratic ballots in odd-year (municipal) elections
* `Latest` the number of primary, general or special elections voted in over the last 6 years
* `Both` 1 if the voter asked for both parties' ballots at some point, 0 otherwise

The `DISPLAY` column, added after the first name, gathers the last name, the birth year and all
the values above in a single label, for example `SMITH 1970 T=3 D=2 R=1 M=1 L=2 B=1`.

The `StreetName` column, added after the residential address, is the address without the house
number.

## Recent elections

The recency window is counted from a reference year, which defaults to the current year. It can be
frozen with `--reference-year` so that the output can be reproduced later.

## Output files

* `<combinedPrefix><date>.xlsx` with all the selected voters
* `<wardPrefix><ward>-<date>.xlsx` for each ward

The ward value is used as is in the file name.

With `--chunk-rows <n>` (or `chunkRows`), the voters of each ward are also written as CSV files of
at most `n` rows, named `<combinedPrefix><date>-<ward>-Rows<start>-<end>.csv`. The rows are counted
from 1 and each file repeats the header row.

*/
